//! The calling convention between the harness and a subject.
//!
//! A subject is either a free function or a method that needs a receiver.
//! Which one it is gets decided where the [`Callable`] is built, not by
//! inspecting the function at run time.

use crate::output::{OutputSink, StdoutSink};
use crate::value::{ConversionError, FromValue, Value};
use std::fmt;

/// A failure raised by a subject (or its constructor) while a case runs.
///
/// Contained at the executor boundary: the case is reported as failed and the
/// run moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseError {
    pub message: String,
    pub detail: Option<String>,
}

impl CaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Builds a case error from any error, keeping its source chain as detail.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        let case = Self::new(err.to_string());
        if chain.is_empty() {
            case
        } else {
            case.with_detail(chain.join("\n"))
        }
    }
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n{}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for CaseError {}

impl From<ConversionError> for CaseError {
    fn from(err: ConversionError) -> Self {
        CaseError::new(format!("argument conversion failed: {}", err))
    }
}

impl From<&str> for CaseError {
    fn from(message: &str) -> Self {
        CaseError::new(message)
    }
}

impl From<String> for CaseError {
    fn from(message: String) -> Self {
        CaseError::new(message)
    }
}

pub type CallResult = std::result::Result<Value, CaseError>;

// ============================================================================
// ARGUMENTS
// ============================================================================

/// Positional arguments of one call, owned by the callee.
///
/// These are copies of the fixture values, so subjects are free to mutate them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Args(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.0.get_mut(index)
    }

    /// Converts a copy of the argument at `index`.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, CaseError> {
        let value = self
            .0
            .get(index)
            .cloned()
            .ok_or_else(|| CaseError::new(format!("missing argument {}", index + 1)))?;
        Ok(T::from_value(value)?)
    }

    /// Converts all arguments at once, checking the arity.
    pub fn unpack<T: FromArgs>(self) -> Result<T, CaseError> {
        T::from_args(self.0)
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args(values)
    }
}

/// Conversion of a whole argument list into a tuple of Rust values.
pub trait FromArgs: Sized {
    fn from_args(args: Vec<Value>) -> Result<Self, CaseError>;
}

fn arity_error(expected: usize, found: usize) -> CaseError {
    CaseError::new(format!(
        "expected {} argument{}, got {}",
        expected,
        if expected == 1 { "" } else { "s" },
        found
    ))
}

impl FromArgs for () {
    fn from_args(args: Vec<Value>) -> Result<Self, CaseError> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(arity_error(0, args.len()))
        }
    }
}

macro_rules! impl_from_args {
    ($count:expr; $($name:ident),+) => {
        impl<$($name: FromValue),+> FromArgs for ($($name,)+) {
            fn from_args(args: Vec<Value>) -> Result<Self, CaseError> {
                if args.len() != $count {
                    return Err(arity_error($count, args.len()));
                }
                let mut iter = args.into_iter();
                Ok(($(
                    $name::from_value(iter.next().unwrap_or_default())?,
                )+))
            }
        }
    };
}

impl_from_args!(1; A);
impl_from_args!(2; A, B);
impl_from_args!(3; A, B, C);
impl_from_args!(4; A, B, C, D);
impl_from_args!(5; A, B, C, D, E);

// ============================================================================
// CALL CONTEXT
// ============================================================================

/// Everything a subject receives for one invocation: its arguments and the
/// sink its printed output goes to.
pub struct Call<'a> {
    args: Args,
    out: &'a mut dyn OutputSink,
}

impl<'a> Call<'a> {
    pub fn new(args: Args, out: &'a mut dyn OutputSink) -> Self {
        Self { args, out }
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Args {
        &mut self.args
    }

    /// Takes ownership of the arguments, leaving none behind.
    pub fn take_args(&mut self) -> Args {
        std::mem::take(&mut self.args)
    }

    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, CaseError> {
        self.args.arg(index)
    }

    pub fn unpack<T: FromArgs>(&mut self) -> Result<T, CaseError> {
        self.take_args().unpack()
    }

    pub fn print(&mut self, text: impl fmt::Display) {
        self.out.emit(&text.to_string());
    }

    pub fn println(&mut self, text: impl fmt::Display) {
        self.out.emit(&format!("{}\n", text));
    }
}

// ============================================================================
// CALLABLES
// ============================================================================

pub type FreeFn = Box<dyn FnMut(&mut Call<'_>) -> CallResult>;
pub type MethodFn<T> = Box<dyn FnMut(&mut T, &mut Call<'_>) -> CallResult>;

/// A subject under test.
///
/// # Examples
///
/// ```rust
/// use svt::runner::Callable;
/// use svt::value::Value;
///
/// let mut add: Callable = Callable::typed(|(a, b): (i64, i64)| a + b);
/// assert!(!add.expects_receiver());
/// assert_eq!(add.call(vec![Value::Int(1), Value::Int(2)]).unwrap(), Value::Int(3));
/// ```
pub enum Callable<T = ()> {
    /// A free function: called with the case inputs only.
    Free(FreeFn),
    /// An instance method: called on a freshly constructed receiver.
    Receiver(MethodFn<T>),
}

impl<T> Callable<T> {
    pub fn free<F>(f: F) -> Self
    where
        F: FnMut(&mut Call<'_>) -> CallResult + 'static,
    {
        Callable::Free(Box::new(f))
    }

    pub fn receiver<F>(f: F) -> Self
    where
        F: FnMut(&mut T, &mut Call<'_>) -> CallResult + 'static,
    {
        Callable::Receiver(Box::new(f))
    }

    /// Wraps a plain Rust function whose arguments are unpacked from the case inputs.
    pub fn typed<A, R, F>(mut f: F) -> Self
    where
        A: FromArgs,
        R: Into<Value>,
        F: FnMut(A) -> R + 'static,
    {
        Callable::free(move |call| Ok(f(call.unpack::<A>()?).into()))
    }

    /// Like [`Callable::typed`], for methods taking `&mut self`.
    pub fn typed_method<A, R, F>(mut f: F) -> Self
    where
        A: FromArgs,
        R: Into<Value>,
        F: FnMut(&mut T, A) -> R + 'static,
    {
        Callable::receiver(move |this, call| Ok(f(this, call.unpack::<A>()?).into()))
    }

    pub fn expects_receiver(&self) -> bool {
        matches!(self, Callable::Receiver(_))
    }

    /// Invokes with the given sink.
    pub fn invoke(&mut self, receiver: Option<&mut T>, call: &mut Call<'_>) -> CallResult {
        match (self, receiver) {
            (Callable::Free(f), _) => f(call),
            (Callable::Receiver(f), Some(this)) => f(this, call),
            (Callable::Receiver(_), None) => {
                Err(CaseError::new("method called without a receiver"))
            }
        }
    }

    /// Calls a free function directly, printing to stdout. This is the
    /// pass-through path and behaves as if the harness were not there.
    pub fn call(&mut self, args: Vec<Value>) -> CallResult {
        let mut sink = StdoutSink;
        let mut call = Call::new(Args::new(args), &mut sink);
        self.invoke(None, &mut call)
    }

    /// Calls a method directly on `receiver`, printing to stdout.
    pub fn call_on(&mut self, receiver: &mut T, args: Vec<Value>) -> CallResult {
        let mut sink = StdoutSink;
        let mut call = Call::new(Args::new(args), &mut sink);
        self.invoke(Some(receiver), &mut call)
    }
}

impl<T> fmt::Debug for Callable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Free(_) => write!(f, "Callable::Free"),
            Callable::Receiver(_) => write!(f, "Callable::Receiver"),
        }
    }
}
