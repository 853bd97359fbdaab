// CSV/TSV parsing into header-keyed rows

use std::ops::Index;

use crate::error::IngestError;

const SNIFF_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// One data record: cells in header order, keyed by (trimmed) header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based record number in the source. Records that failed to parse
    /// still take a number, so later rows keep pointing at the right line.
    pub number: usize,
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new(number: usize) -> Self {
        Self { number, cells: Vec::new() }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.push((column.into(), value.into()));
    }

    /// First cell under `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Cells in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Index<&str> for Row {
    type Output = String;

    fn index(&self, column: &str) -> &String {
        match self.cells.iter().find(|(c, _)| c == column) {
            Some((_, value)) => value,
            None => panic!("row {} has no column '{}'", self.number, column),
        }
    }
}

/// Parse delimited text with a header row.
///
/// Short records are allowed (missing trailing cells are simply absent).
/// A record that fails to parse is reported and skipped; the rest continue.
pub fn parse_rows(
    content: &str,
    delimiter: Option<u8>,
    mut on_error: impl FnMut(IngestError),
) -> Vec<Row> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(content));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(|h| h.to_string()).collect(),
        Err(e) => {
            on_error(IngestError::Header(e.to_string()));
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let number = idx + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                on_error(IngestError::Record { row: number, message: e.to_string() });
                continue;
            }
        };
        // Extra cells beyond the header have no column name and are dropped
        let mut row = Row::new(number);
        for (header, value) in headers.iter().zip(record.iter()) {
            row.push(header.as_str(), value);
        }
        rows.push(row);
    }

    log::debug!("parsed {} row(s) with delimiter {:?}", rows.len(), delimiter as char);
    rows
}

/// Guess the field delimiter from the first few lines.
///
/// Each candidate parses the sample once; its score is the header's field
/// count times the number of records that agree with it. A header that does
/// not split scores nothing. Ties go to the earlier candidate, and comma is
/// the fallback.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample = content.lines().take(SNIFF_LINES).collect::<Vec<_>>().join("\n");

    SNIFF_CANDIDATES
        .iter()
        .filter_map(|&delim| sniff_score(&sample, delim).map(|score| (score, delim)))
        .fold((0, b','), |best, candidate| if candidate.0 > best.0 { candidate } else { best })
        .1
}

fn sniff_score(sample: &str, delim: u8) -> Option<usize> {
    let widths: Vec<usize> = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes())
        .records()
        .map(|record| record.map_or(1, |r| r.len()))
        .collect();

    let header = *widths.first()?;
    (header > 1).then(|| header * widths.iter().filter(|&&w| w == header).count())
}

/// Decode raw bytes to text: UTF-8 (BOM stripped), else Windows-1252 as Excel exports it.
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> (Vec<Row>, Vec<IngestError>) {
        let mut errors = Vec::new();
        let rows = parse_rows(content, None, |e| errors.push(e));
        (rows, errors)
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;SkinSoftening;LipsColor\nGlow;0.8;red\nSoft;0.3;pink\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tSkinSoftening\nGlow\t0.8\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;SkinColor;LipsColor\n\"Warm, light\";\"0.9 0.7 0.6 1\";red\nCool;\"0.6 0.7 0.9 1\";pink\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("Name\nGlow\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_parse_rows_keys_by_trimmed_header() {
        let (rows, errors) = parse(" Name , TeethWhitening\nSmile,1\n");
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "Smile");
        assert_eq!(rows[0]["TeethWhitening"], "1");
    }

    #[test]
    fn test_parse_rows_short_record_leaves_columns_absent() {
        let (rows, errors) = parse("Name,SkinSoftening,TeethWhitening\nA,0.5\nB,0.1,0.9\n");
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].contains("TeethWhitening"));
        assert_eq!(rows[1]["TeethWhitening"], "0.9");
    }

    #[test]
    fn test_parse_rows_numbers_records_and_keeps_header_order() {
        let (rows, _) = parse("Name,TeethWhitening,SkinSoftening\nA,1,2\nB,3,4\n");
        assert_eq!(rows.iter().map(|r| r.number).collect::<Vec<_>>(), vec![1, 2]);
        let columns: Vec<&str> = rows[1].iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["Name", "TeethWhitening", "SkinSoftening"]);
    }

    #[test]
    fn test_sniff_ignores_lines_past_the_sample() {
        let mut content = String::from("Name|EyesFlare\n");
        for i in 0..9 {
            content.push_str(&format!("p{i}|0.{i}\n"));
        }
        // anything after the tenth line never reaches the sniffer
        content.push_str("a,b,c,d,e,f,g,h\n");
        assert_eq!(sniff_delimiter(&content), b'|');
    }

    #[test]
    fn test_parse_rows_forced_delimiter() {
        let mut errors = Vec::new();
        let rows = parse_rows("Name|EyesFlare\nX|0.4\n", Some(b'|'), |e| errors.push(e));
        assert_eq!(rows[0]["EyesFlare"], "0.4");
    }

    #[test]
    fn test_decode_text_falls_back_to_windows_1252() {
        // "Café" with 0xE9 (é in Windows-1252), invalid as UTF-8
        let decoded = decode_text(vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(decoded, "Café");
    }

    #[test]
    fn test_decode_text_strips_bom() {
        let mut bytes = "\u{feff}Name".as_bytes().to_vec();
        bytes.extend_from_slice(b",X");
        assert_eq!(decode_text(bytes), "Name,X");
    }
}
