// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use ejson::{Driver, Frame, JsonStr, ParseError, Value};

/// Parses extended JSON documents and prints the events they produce.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Read a document from a file; may be repeated
    #[arg(short, long = "input", value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Limit nesting to this many levels using a fixed stack
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Inline documents
    documents: Vec<String>,
}

/// Echoes every event in a compact, JSON-like form.
#[derive(Default)]
struct Printer {
    out: String,
    /// A member name was printed and its value has not started yet.
    name_pending: bool,
    failure: Option<(ParseError, String)>,
}

fn decode(s: JsonStr<'_>) -> String {
    let mut buf = vec![0u8; s.len()];
    match s.decode_into(&mut buf) {
        Ok(len) => String::from_utf8_lossy(&buf[..len]).into_owned(),
        Err(e) => format!("<{}>", e),
    }
}

impl Printer {
    fn separate_name(&mut self) {
        if self.name_pending {
            self.out.push_str(": ");
            self.name_pending = false;
        }
    }
}

impl<'a> Driver<'a> for Printer {
    fn set_name(&mut self, name: JsonStr<'a>) {
        let _ = write!(self.out, "{:?}", decode(name));
        self.name_pending = true;
    }
    fn open_array(&mut self) {
        self.separate_name();
        self.out.push('[');
    }
    fn close_array(&mut self) {
        self.out.push_str("], ");
    }
    fn open_object(&mut self) {
        self.separate_name();
        self.out.push('{');
    }
    fn close_object(&mut self) {
        self.out.push_str("}, ");
    }
    fn set_value(&mut self, value: Value<'a>) {
        self.separate_name();
        let _ = match value {
            Value::Null => write!(self.out, "null"),
            Value::Bool(b) => write!(self.out, "{}", b),
            Value::Integer(i) => write!(self.out, "{}", i),
            Value::Hex(h) => write!(self.out, "{:#x}", h),
            Value::Float(f) => write!(self.out, "{:?}", f),
            Value::String(s) => write!(self.out, "{:?}", decode(s)),
        };
        self.out.push_str(", ");
    }
    fn add_flag(&mut self, flag: JsonStr<'a>) {
        if self.name_pending {
            let _ = write!(self.out, "({})", decode(flag));
        } else {
            // Flags of a string value go before its separator
            let end = self.out.trim_end_matches(", ").len();
            self.out.truncate(end);
            let _ = write!(self.out, "({}), ", decode(flag));
        }
    }
    fn open_data(&mut self) {
        self.separate_name();
        self.out.push_str("% '");
    }
    fn add_data(&mut self, data: &[u8]) {
        for byte in data {
            let _ = write!(self.out, "{:02x}", byte);
        }
    }
    fn close_data(&mut self) {
        self.out.push_str("' %, ");
    }
    fn error(&mut self, error: ParseError, context: &'a [u8]) {
        let near = &context[..context.len().min(24)];
        self.failure = Some((error, String::from_utf8_lossy(near).into_owned()));
    }
}

fn dump(label: &str, input: &[u8], max_depth: Option<usize>) -> bool {
    println!("### parsing {}, {} bytes", label, input.len());
    let mut printer = Printer::default();
    let result = match max_depth {
        Some(depth) => {
            let mut slots = vec![Frame::default(); depth];
            ejson::parse_full(&mut printer, input, Some(slots.as_mut_slice()))
        }
        None => ejson::parse(&mut printer, input),
    };
    println!("{}", printer.out.trim_end_matches([',', ' ']));
    match printer.failure {
        Some((error, near)) => {
            log::debug!("status {}", ejson::status(result));
            eprintln!("error: {} near {:?}", error, near);
            false
        }
        None => true,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut ok = true;
    for path in &args.inputs {
        match fs::read(path) {
            Ok(input) => ok &= dump(&path.display().to_string(), &input, args.max_depth),
            Err(e) => {
                eprintln!("error: unable to read '{}': {}", path.display(), e);
                ok = false;
            }
        }
    }
    for document in &args.documents {
        ok &= dump(&format!("'{}'", document), document.as_bytes(), args.max_depth);
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(input: &str) -> String {
        let mut printer = Printer::default();
        ejson::parse(&mut printer, input.as_bytes()).unwrap();
        printer.out
    }

    #[test]
    fn test_flagged_array_element_is_not_a_member() {
        assert_eq!(printed(r#"["a"(x), 1]"#), r#"["a"(x), 1, ], "#);
    }

    #[test]
    fn test_member_separators() {
        assert_eq!(
            printed(r#"{"n"(dirty):5, "l":[], "d":%TQ==%}"#),
            r#"{"n"(dirty): 5, "l": [], "d": % '4d' %, }, "#
        );
    }
}
