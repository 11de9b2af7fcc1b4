use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lsrsim_frame::{FrameKind, Label, Packet};
use lsrsim_router::SimulationReport;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Fields of a decoded packet, label frame or link frame.
#[derive(Debug, Serialize)]
pub struct DecodedFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    pub priority: u8,
    pub destination: String,
    pub payload: String,
}

impl DecodedFrame {
    pub fn new(kind: Option<FrameKind>, label: Option<Label>, packet: &Packet) -> Self {
        Self {
            kind: kind.map(FrameKind::name),
            label,
            priority: packet.priority.value(),
            destination: packet.destination.to_string(),
            payload: payload_preview(&packet.payload),
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    wire: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

pub fn print_encoded(
    wire: &[u8],
    label: Option<Label>,
    kind: Option<FrameKind>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                wire: payload_preview(wire),
                size: wire.len(),
                label,
                kind: kind.map(FrameKind::name),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["WIRE", "SIZE"])
                .add_row(vec![payload_preview(wire), wire.len().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} ({} bytes)", payload_preview(wire), wire.len());
        }
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_decoded(frame: &DecodedFrame, format: OutputFormat) {
    let label = frame.label.map(|l| l.to_string()).unwrap_or_default();
    let kind = frame.kind.unwrap_or_default();
    match format {
        OutputFormat::Json => print_json(frame),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "LABEL", "PRIORITY", "DESTINATION", "PAYLOAD"])
                .add_row(vec![
                    kind.to_string(),
                    label,
                    frame.priority.to_string(),
                    frame.destination.clone(),
                    frame.payload.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = String::new();
            if !kind.is_empty() {
                line.push_str(&format!("kind={kind} "));
            }
            if !label.is_empty() {
                line.push_str(&format!("label={label} "));
            }
            println!(
                "{line}priority={} destination={} payload={}",
                frame.priority, frame.destination, frame.payload
            );
        }
        OutputFormat::Raw => print_raw(frame.payload.as_bytes()),
    }
}

pub fn print_report(report: &SimulationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut routers = Table::new();
            routers
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "ROUTER", "RECEIVED", "ENCAP", "SWITCHED", "DECAP", "DROPPED", "FAULTS",
                ]);
            for r in &report.routers {
                routers.add_row(vec![
                    r.name.clone(),
                    r.stats.received.to_string(),
                    r.stats.encapsulated.to_string(),
                    r.stats.switched.to_string(),
                    r.stats.decapsulated.to_string(),
                    r.stats.dropped.to_string(),
                    r.stats.faults.to_string(),
                ]);
            }
            println!("{routers}");

            let mut hosts = Table::new();
            hosts
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["HOST", "ADDRESS", "PRIORITY", "PAYLOAD"]);
            for h in &report.hosts {
                for p in &h.received {
                    hosts.add_row(vec![
                        h.name.clone(),
                        h.address.to_string(),
                        p.priority.to_string(),
                        p.payload.clone(),
                    ]);
                }
            }
            println!("{hosts}");
            println!(
                "links={} delivered={} dropped={} elapsed={}ms",
                report.links.links,
                report.links.delivered,
                report.links.dropped,
                report.elapsed_ms
            );
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for r in &report.routers {
                let s = &r.stats;
                println!(
                    "router {} received={} encapsulated={} switched={} decapsulated={} dropped={} faults={}",
                    r.name, s.received, s.encapsulated, s.switched, s.decapsulated, s.dropped, s.faults
                );
            }
            for h in &report.hosts {
                for p in &h.received {
                    println!(
                        "host {} ({}) received priority={} payload={}",
                        h.name, h.address, p.priority, p.payload
                    );
                }
            }
            println!(
                "links={} delivered={} dropped={} elapsed={}ms",
                report.links.links,
                report.links.delivered,
                report.links.dropped,
                report.elapsed_ms
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
