// SPDX-License-Identifier: Apache-2.0

// Shared recording driver for the integration tests
#![allow(dead_code)]

use ejson::{Driver, ErrorKind, JsonStr, ParseError, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Name(String),
    OpenArray,
    CloseArray,
    OpenObject,
    CloseObject,
    Null,
    Bool(bool),
    Int(i64),
    Hex(u64),
    Float(f64),
    Str(String),
    Flag(String),
    OpenData,
    Data(Vec<u8>),
    CloseData,
    Error(ErrorKind, usize, Vec<u8>),
}

fn decoded(s: JsonStr<'_>) -> String {
    s.unescaped().expect("escapes were validated").into_owned()
}

/// Records every callback, optionally asking to stop once `cancel_after` events are in.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub cancel_after: Option<usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(events: usize) -> Self {
        Self {
            events: Vec::new(),
            cancel_after: Some(events),
        }
    }

    /// Concatenation of all data chunks seen.
    pub fn data(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Data(d) => Some(d.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    pub fn data_chunks(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Data(d) => Some(d.len()),
                _ => None,
            })
            .collect()
    }

    /// Asserts opens and closes nest properly, ignoring a trailing error.
    pub fn assert_well_nested(&self) {
        let mut open = Vec::new();
        for event in &self.events {
            match event {
                Event::OpenArray | Event::OpenObject | Event::OpenData => open.push(event.clone()),
                Event::CloseArray => assert_eq!(open.pop(), Some(Event::OpenArray)),
                Event::CloseObject => assert_eq!(open.pop(), Some(Event::OpenObject)),
                Event::CloseData => assert_eq!(open.pop(), Some(Event::OpenData)),
                Event::Error(..) => return,
                _ => {}
            }
        }
        assert!(open.is_empty(), "unclosed containers: {:?}", open);
    }
}

impl<'a> Driver<'a> for Recorder {
    fn set_name(&mut self, name: JsonStr<'a>) {
        self.events.push(Event::Name(decoded(name)));
    }
    fn open_array(&mut self) {
        self.events.push(Event::OpenArray);
    }
    fn close_array(&mut self) {
        self.events.push(Event::CloseArray);
    }
    fn open_object(&mut self) {
        self.events.push(Event::OpenObject);
    }
    fn close_object(&mut self) {
        self.events.push(Event::CloseObject);
    }
    fn set_value(&mut self, value: Value<'a>) {
        self.events.push(match value {
            Value::Null => Event::Null,
            Value::Bool(b) => Event::Bool(b),
            Value::Integer(i) => Event::Int(i),
            Value::Hex(h) => Event::Hex(h),
            Value::Float(f) => Event::Float(f),
            Value::String(s) => Event::Str(decoded(s)),
        });
    }
    fn add_flag(&mut self, flag: JsonStr<'a>) {
        self.events.push(Event::Flag(decoded(flag)));
    }
    fn open_data(&mut self) {
        self.events.push(Event::OpenData);
    }
    fn add_data(&mut self, data: &[u8]) {
        self.events.push(Event::Data(data.to_vec()));
    }
    fn close_data(&mut self) {
        self.events.push(Event::CloseData);
    }
    fn error(&mut self, error: ParseError, context: &'a [u8]) {
        self.events
            .push(Event::Error(error.kind(), error.position(), context.to_vec()));
    }
    fn cancelled(&self) -> bool {
        self.cancel_after
            .is_some_and(|limit| self.events.len() >= limit)
    }
}

/// Parses `input` with the default stack and returns the recorder.
pub fn record(input: &[u8]) -> (Result<(), ParseError>, Recorder) {
    let mut recorder = Recorder::new();
    let result = ejson::parse(&mut recorder, input);
    (result, recorder)
}

pub fn name(s: &str) -> Event {
    Event::Name(s.to_string())
}

pub fn string(s: &str) -> Event {
    Event::Str(s.to_string())
}

pub fn flag(s: &str) -> Event {
    Event::Flag(s.to_string())
}
