// SPDX-License-Identifier: Apache-2.0

//! The parser state machine and its entry points.

use crate::base64_decoder::Base64Decoder;
use crate::driver::{Driver, JsonStr, Value};
use crate::frame_stack::{FixedStack, Frame, FrameStack};
#[cfg(feature = "alloc")]
use crate::frame_stack::VecStack;
use crate::number_parser::parse_number;
use crate::parse_error::{ErrorKind, ParseError};
use crate::scanner::{Scanner, Token};

/// What the machine expects next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// A value; inside an array `]` is also accepted.
    Value,
    /// A member name or `}`.
    Name,
    /// `,` or the close bracket of the current container.
    CommaOrClose,
    /// The root value is complete; only the end of input may follow.
    Done,
}

/// A reusable parser owning its frame stack.
///
/// ```
/// use ejson::{Driver, Frame, FixedStack, Parser, Value};
///
/// #[derive(Default)]
/// struct Sum(i64);
///
/// impl Driver<'_> for Sum {
///     fn set_value(&mut self, value: Value<'_>) {
///         if let Value::Integer(n) = value {
///             self.0 += n;
///         }
///     }
/// }
///
/// let mut slots = [Frame::default(); 4];
/// let mut parser = Parser::with_stack(FixedStack::new(&mut slots));
/// let mut sum = Sum::default();
/// parser.parse(&mut sum, b"[1, [2, 3], {\"x\": 4}]").unwrap();
/// assert_eq!(sum.0, 10);
/// ```
#[derive(Debug)]
pub struct Parser<S> {
    stack: S,
}

#[cfg(feature = "alloc")]
impl Parser<VecStack> {
    /// A parser with a growable heap stack.
    pub fn new() -> Self {
        Self::with_stack(VecStack::new())
    }
}

#[cfg(feature = "alloc")]
impl Default for Parser<VecStack> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FrameStack> Parser<S> {
    pub fn with_stack(stack: S) -> Self {
        Self { stack }
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn into_stack(self) -> S {
        self.stack
    }

    /// Parses `input`, reporting events to `driver`.
    ///
    /// The stack is prepared before the first token and released exactly once
    /// afterwards. On failure `driver.error()` is called once before returning.
    pub fn parse<'a, D>(&mut self, driver: &mut D, input: &'a [u8]) -> Result<(), ParseError>
    where
        D: Driver<'a> + ?Sized,
    {
        let mut machine = Machine {
            scanner: Scanner::new(input),
            stack: &mut self.stack,
            driver,
        };
        let result = match machine.stack.prepare() {
            Ok(()) => machine.run(),
            Err(_) => Err(ParseError::new(ErrorKind::NoStack, 0)),
        };
        machine.stack.release();

        if let Err(error) = result {
            log::debug!("parse failed: {}", error);
            let context = machine.scanner.rest_from(error.position());
            machine.driver.error(error, context);
        }
        result
    }
}

/// Parses `input` with a growable heap stack.
#[cfg(feature = "alloc")]
pub fn parse<'a, D>(driver: &mut D, input: &'a [u8]) -> Result<(), ParseError>
where
    D: Driver<'a> + ?Sized,
{
    Parser::new().parse(driver, input)
}

/// Parses `input` with a caller supplied fixed stack, or a growable one when `None`.
///
/// Without the `alloc` feature `None` means zero capacity: any container fails
/// with [`ErrorKind::NoStack`].
pub fn parse_full<'a, D>(
    driver: &mut D,
    input: &'a [u8],
    stack: Option<&mut [Frame]>,
) -> Result<(), ParseError>
where
    D: Driver<'a> + ?Sized,
{
    match stack {
        Some(slots) => Parser::with_stack(FixedStack::new(slots)).parse(driver, input),
        #[cfg(feature = "alloc")]
        None => parse(driver, input),
        #[cfg(not(feature = "alloc"))]
        None => Parser::with_stack(FixedStack::new(&mut [])).parse(driver, input),
    }
}

/// Parses `input` using any [`FrameStack`] strategy.
pub fn parse_with_stack<'a, D, S>(
    driver: &mut D,
    input: &'a [u8],
    stack: &mut S,
) -> Result<(), ParseError>
where
    D: Driver<'a> + ?Sized,
    S: FrameStack + ?Sized,
{
    Parser::with_stack(stack).parse(driver, input)
}

struct Machine<'a, 'r, S: ?Sized, D: ?Sized> {
    scanner: Scanner<'a>,
    stack: &'r mut S,
    driver: &'r mut D,
}

impl<'a, S, D> Machine<'a, '_, S, D>
where
    S: FrameStack + ?Sized,
    D: Driver<'a> + ?Sized,
{
    fn run(&mut self) -> Result<(), ParseError> {
        let mut state = State::Value;
        loop {
            if self.driver.cancelled() {
                return Err(ParseError::new(ErrorKind::Cancelled, self.scanner.pos()));
            }
            let token = self.scanner.next_token();
            state = match state {
                State::Value => self.expect_value(token)?,
                State::Name => self.expect_name(token)?,
                State::CommaOrClose => self.expect_comma_or_close(token)?,
                State::Done => {
                    return match token {
                        Token::End => Ok(()),
                        _ => Err(ParseError::new(ErrorKind::Parse, self.scanner.pos())),
                    }
                }
            };
        }
    }

    fn string_at(&self, start: usize, end: usize) -> JsonStr<'a> {
        JsonStr::new(self.scanner.slice(start, end), start, end)
    }

    /// State after a value or a close bracket.
    fn settled(&self) -> State {
        if self.stack.depth() == 0 {
            State::Done
        } else {
            State::CommaOrClose
        }
    }

    fn open(&mut self, frame: Frame) -> Result<(), ParseError> {
        let pos = self.scanner.pos();
        self.stack.push(frame).map_err(|_| {
            log::debug!("no stack for {:?} at depth {}", frame, self.stack.depth());
            ParseError::new(ErrorKind::NoStack, pos)
        })?;
        self.scanner.bump();
        log::trace!("open {:?}, depth {}", frame, self.stack.depth());
        match frame {
            Frame::Array => self.driver.open_array(),
            Frame::Object => self.driver.open_object(),
        }
        Ok(())
    }

    fn close(&mut self) -> State {
        self.scanner.bump();
        let frame = self.stack.pop();
        log::trace!("close {:?}, depth {}", frame, self.stack.depth());
        match frame {
            Some(Frame::Array) => self.driver.close_array(),
            Some(Frame::Object) => self.driver.close_object(),
            None => {}
        }
        self.settled()
    }

    fn expect_value(&mut self, token: Token) -> Result<State, ParseError> {
        let pos = self.scanner.pos();
        let value = match token {
            Token::ObjectStart => {
                self.open(Frame::Object)?;
                return Ok(State::Name);
            }
            Token::ArrayStart => {
                self.open(Frame::Array)?;
                return Ok(State::Value);
            }
            Token::ArrayEnd if self.stack.top() == Some(Frame::Array) => {
                return Ok(self.close());
            }
            Token::Quote => {
                let (start, end) = self.scanner.scan_string()?;
                let value = self.string_at(start, end);
                self.driver.set_value(Value::String(value));
                self.flags(ErrorKind::Value)?;
                return Ok(self.settled());
            }
            Token::DataDelimiter => {
                self.data_block()?;
                return Ok(self.settled());
            }
            Token::Number => {
                let (start, end) = self.scanner.scan_number();
                parse_number(self.scanner.slice(start, end))
                    .ok_or_else(|| ParseError::new(ErrorKind::Value, start))?
            }
            Token::True => self.literal(b"true", Value::Bool(true))?,
            Token::False => self.literal(b"false", Value::Bool(false))?,
            Token::Null => self.literal(b"null", Value::Null)?,
            Token::End if self.stack.depth() == 0 => {
                return Err(ParseError::new(ErrorKind::Parse, pos));
            }
            Token::Other(byte) => {
                log::trace!("unexpected byte {:#04x} where a value should start", byte);
                return Err(ParseError::new(ErrorKind::Value, pos));
            }
            _ => return Err(ParseError::new(ErrorKind::Value, pos)),
        };
        self.driver.set_value(value);
        Ok(self.settled())
    }

    fn literal(&mut self, word: &[u8], value: Value<'a>) -> Result<Value<'a>, ParseError> {
        let pos = self.scanner.pos();
        if self.scanner.match_literal(word) {
            Ok(value)
        } else {
            Err(ParseError::new(ErrorKind::Value, pos))
        }
    }

    fn expect_name(&mut self, token: Token) -> Result<State, ParseError> {
        match token {
            Token::ObjectEnd => Ok(self.close()),
            Token::Quote => {
                let (start, end) = self.scanner.scan_string()?;
                let name = self.string_at(start, end);
                self.driver.set_name(name);
                self.flags(ErrorKind::ObjectElement)?;
                if self.scanner.next_token() != Token::Colon {
                    return Err(ParseError::new(ErrorKind::ObjectElement, self.scanner.pos()));
                }
                self.scanner.bump();
                Ok(State::Value)
            }
            _ => Err(ParseError::new(ErrorKind::ObjectElement, self.scanner.pos())),
        }
    }

    fn expect_comma_or_close(&mut self, token: Token) -> Result<State, ParseError> {
        let top = self.stack.top();
        match (token, top) {
            (Token::Comma, Some(Frame::Object)) => {
                self.scanner.bump();
                Ok(State::Name)
            }
            (Token::Comma, _) => {
                self.scanner.bump();
                Ok(State::Value)
            }
            (Token::ObjectEnd, Some(Frame::Object)) | (Token::ArrayEnd, Some(Frame::Array)) => {
                Ok(self.close())
            }
            (_, Some(Frame::Object)) => {
                Err(ParseError::new(ErrorKind::ObjectElement, self.scanner.pos()))
            }
            _ => Err(ParseError::new(ErrorKind::ListElement, self.scanner.pos())),
        }
    }

    /// Parses an optional `(word, word)` list, reporting each word.
    fn flags(&mut self, kind: ErrorKind) -> Result<(), ParseError> {
        if self.scanner.next_token() != Token::FlagsStart {
            return Ok(());
        }
        self.scanner.bump();
        self.scanner.skip_whitespace();
        if self.scanner.peek() == Some(b')') {
            self.scanner.bump();
            return Ok(());
        }
        loop {
            self.scanner.skip_whitespace();
            let (start, end) = self.scanner.scan_flag_word();
            if start == end {
                return Err(ParseError::new(kind, start));
            }
            let flag = self.string_at(start, end);
            self.driver.add_flag(flag);
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                Some(b',') => self.scanner.bump(),
                Some(b')') => {
                    self.scanner.bump();
                    return Ok(());
                }
                _ => return Err(ParseError::new(kind, self.scanner.pos())),
            }
        }
    }

    /// Decodes a `%...%` block, the cursor being on the opening delimiter.
    fn data_block(&mut self) -> Result<(), ParseError> {
        self.scanner.bump();
        log::trace!("data block at {}", self.scanner.pos());
        self.driver.open_data();

        let mut decoder = Base64Decoder::new();
        let driver = &mut *self.driver;
        let mut sink = |chunk: &[u8]| driver.add_data(chunk);
        loop {
            let pos = self.scanner.pos();
            match self.scanner.peek() {
                None => return Err(ParseError::new(ErrorKind::Base64, pos)),
                Some(b'%') => {
                    decoder.finish(&mut sink).map_err(|e| {
                        log::debug!("{} at {}", e, pos);
                        ParseError::new(ErrorKind::Base64, pos)
                    })?;
                    self.scanner.bump();
                    break;
                }
                Some(byte) => {
                    decoder.push(byte, &mut sink).map_err(|e| {
                        log::debug!("{} at {}", e, pos);
                        ParseError::new(ErrorKind::Base64, pos)
                    })?;
                    self.scanner.bump();
                }
            }
        }
        self.driver.close_data();
        Ok(())
    }
}
