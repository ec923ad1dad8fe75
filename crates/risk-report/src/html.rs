//! XHTML report.

use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use risk_model::format_numeric;

use crate::error::{ReportError, Result};
use crate::record::{RecordReport, RecordReporter, generated_at};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 10px;text-align:left}\
td.positive{color:#0000FF}\
p.generated{color:#888;font-size:small}";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReporter;

impl RecordReporter for HtmlReporter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn write(&self, report: &RecordReport<'_>, path: &Path) -> Result<()> {
        let html = render_html(report).map_err(|source| ReportError::Html {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, html).map_err(|source| ReportError::io(path, source))
    }
}

/// Renders the report document. Text is escaped by the writer.
pub fn render_html(report: &RecordReport<'_>) -> std::result::Result<Vec<u8>, quick_xml::Error> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    let title = format!("Patient {}", report.record_id());

    xml.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    let mut root = BytesStart::new("html");
    root.push_attribute(("xmlns", XHTML_NS));
    root.push_attribute(("lang", "en"));
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new("head")))?;
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("charset", "utf-8"));
    xml.write_event(Event::Empty(meta))?;
    write_text_element(&mut xml, "title", &title)?;
    write_text_element(&mut xml, "style", STYLE)?;
    xml.write_event(Event::End(BytesEnd::new("head")))?;

    xml.write_event(Event::Start(BytesStart::new("body")))?;
    write_text_element(&mut xml, "h1", &title)?;

    write_text_element(&mut xml, "h2", "Raw data")?;
    let raw: Vec<(String, String, bool)> = report
        .raw()
        .map(|(label, cell)| (label.to_string(), cell.display(), false))
        .collect();
    write_table(&mut xml, ["Variable", "Value"], &raw)?;

    write_text_element(&mut xml, "h2", "Computed scores")?;
    if report.computed().is_empty() {
        write_text_element(&mut xml, "p", "No scores computed.")?;
    } else {
        let computed: Vec<(String, String, bool)> = report
            .computed()
            .iter()
            .map(|(name, value)| (name.to_string(), format_numeric(*value), *value > 0.0))
            .collect();
        write_table(&mut xml, ["Score", "Value"], &computed)?;
    }

    write_text_element(&mut xml, "h2", "Missed scores")?;
    let mut missed = report.missed().peekable();
    if missed.peek().is_none() {
        write_text_element(&mut xml, "p", "All scores computed.")?;
    } else {
        xml.write_event(Event::Start(BytesStart::new("ul")))?;
        for (name, reasons) in missed {
            xml.write_event(Event::Start(BytesStart::new("li")))?;
            write_text_element(&mut xml, "strong", name)?;
            xml.write_event(Event::Text(BytesText::new(&format!(
                ": {}",
                reasons.join(", ")
            ))))?;
            xml.write_event(Event::End(BytesEnd::new("li")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("ul")))?;
    }

    let mut footer = BytesStart::new("p");
    footer.push_attribute(("class", "generated"));
    xml.write_event(Event::Start(footer))?;
    xml.write_event(Event::Text(BytesText::new(&format!(
        "Generated {}",
        generated_at()
    ))))?;
    xml.write_event(Event::End(BytesEnd::new("p")))?;

    xml.write_event(Event::End(BytesEnd::new("body")))?;
    xml.write_event(Event::End(BytesEnd::new("html")))?;
    let mut bytes = xml.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Two-column table; rows flagged `true` get the `positive` class on the
/// value cell.
fn write_table<W: Write>(
    xml: &mut Writer<W>,
    headers: [&str; 2],
    rows: &[(String, String, bool)],
) -> std::result::Result<(), quick_xml::Error> {
    xml.write_event(Event::Start(BytesStart::new("table")))?;
    xml.write_event(Event::Start(BytesStart::new("thead")))?;
    xml.write_event(Event::Start(BytesStart::new("tr")))?;
    for header in headers {
        write_text_element(xml, "th", header)?;
    }
    xml.write_event(Event::End(BytesEnd::new("tr")))?;
    xml.write_event(Event::End(BytesEnd::new("thead")))?;

    xml.write_event(Event::Start(BytesStart::new("tbody")))?;
    for (label, value, positive) in rows {
        xml.write_event(Event::Start(BytesStart::new("tr")))?;
        write_text_element(xml, "td", label)?;
        let mut cell = BytesStart::new("td");
        if *positive {
            cell.push_attribute(("class", "positive"));
        }
        xml.write_event(Event::Start(cell))?;
        xml.write_event(Event::Text(BytesText::new(value)))?;
        xml.write_event(Event::End(BytesEnd::new("td")))?;
        xml.write_event(Event::End(BytesEnd::new("tr")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("tbody")))?;
    xml.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    text: &str,
) -> std::result::Result<(), quick_xml::Error> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
