use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// One physical card to print. Produced once per deck line and replicated
/// `quantity` times before reaching the layout engine; entry order is
/// preserved all the way into page/cell assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEntry {
    pub front: String,
    pub back: Option<String>,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
}

/// A single successfully parsed deck line, before quantity expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub quantity: u32,
    pub front: String,
    pub back: Option<String>,
    pub set_code: String,
    pub collector_number: String,
}

impl ParsedLine {
    fn entry(&self) -> CardEntry {
        CardEntry {
            front: self.front.clone(),
            back: self.back.clone(),
            set_code: Some(self.set_code.clone()),
            collector_number: Some(self.collector_number.clone()),
        }
    }
}

fn line_pattern() -> &'static Regex {
    // MTGA export format: `<qty> <name>[ // <name2>] (<SET>) <number>`.
    // Trailing text after the collector number is tolerated, like the rest
    // of the best-effort grammar.
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^(\d+)\s+(.*?)\s+\((\w+)\)\s+(\d+)").expect("invalid deck line regex")
    })
}

/// Parse one deck line. Lines that do not match the grammar (blank lines,
/// comments, section headers) yield `None` and are skipped by the caller;
/// this is a best-effort parser, not a validator.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let caps = line_pattern().captures(line.trim())?;

    let quantity: u32 = caps[1].parse().ok()?;
    if quantity == 0 {
        return None;
    }

    // ` // ` in the name portion marks a double-faced card.
    let name = &caps[2];
    let (front, back) = match name.split_once(" // ") {
        Some((front, back)) => (front.trim().to_string(), Some(back.trim().to_string())),
        None => (name.to_string(), None),
    };

    Some(ParsedLine {
        quantity,
        front,
        back,
        set_code: caps[3].to_string(),
        collector_number: caps[4].to_string(),
    })
}

/// Read a deck file and expand it into the flattened entry list handed to
/// the layout engine: one `CardEntry` per physical card, in input order.
pub fn load_deck(path: &Path) -> io::Result<Vec<CardEntry>> {
    let text = fs::read_to_string(path)?;
    let mut entries = Vec::new();
    for line in text.lines() {
        if let Some(parsed) = parse_line(line) {
            for _ in 0..parsed.quantity {
                entries.push(parsed.entry());
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_single_faced_line() {
        let parsed = parse_line("4 Lightning Bolt (2XM) 129").unwrap();
        assert_eq!(parsed.quantity, 4);
        assert_eq!(parsed.front, "Lightning Bolt");
        assert_eq!(parsed.back, None);
        assert_eq!(parsed.set_code, "2XM");
        assert_eq!(parsed.collector_number, "129");
    }

    #[test]
    fn parses_double_faced_line() {
        let parsed = parse_line("2 Delver of Secrets // Insectile Aberration (ISD) 51").unwrap();
        assert_eq!(parsed.quantity, 2);
        assert_eq!(parsed.front, "Delver of Secrets");
        assert_eq!(parsed.back.as_deref(), Some("Insectile Aberration"));
        assert_eq!(parsed.set_code, "ISD");
        assert_eq!(parsed.collector_number, "51");
    }

    #[test]
    fn round_trips_through_reserialization() {
        let original = "3 Opt (XLN) 65";
        let parsed = parse_line(original).unwrap();
        let serialized = format!(
            "{} {} ({}) {}",
            parsed.quantity, parsed.front, parsed.set_code, parsed.collector_number
        );
        assert_eq!(serialized, original);
        assert_eq!(parse_line(&serialized).unwrap(), parsed);
    }

    #[test]
    fn skips_non_matching_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("Deck"), None);
        assert_eq!(parse_line("# land base"), None);
        assert_eq!(parse_line("Lightning Bolt (2XM) 129"), None);
        assert_eq!(parse_line("x Lightning Bolt (2XM) 129"), None);
    }

    #[test]
    fn skips_zero_quantity() {
        assert_eq!(parse_line("0 Opt (XLN) 65"), None);
    }

    #[test]
    fn load_deck_expands_quantities_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "2 Opt (XLN) 65").unwrap();
        writeln!(file, "not a card line").unwrap();
        writeln!(file, "1 Shock (M21) 159").unwrap();

        let entries = load_deck(&path).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.front.as_str()).collect();
        assert_eq!(names, vec!["Opt", "Opt", "Shock"]);
        assert_eq!(entries[0].set_code.as_deref(), Some("XLN"));
        assert_eq!(entries[2].collector_number.as_deref(), Some("159"));
    }
}
