//! Exception capture and serialization.
//!
//! [`ExceptionInfo`] is a language-neutral snapshot of an error: message,
//! type name, optional diagnostic metadata, an optional cause chain and, for
//! errors that bundle several independent failures, a list of aggregated
//! members. [`serialize_exception`] turns a snapshot into the nested
//! [`Document`] stored in the `Exception` column.
//!
//! Aggregates are flattened before serialization. An aggregate that boils
//! down to a single underlying failure is serialized as that failure; only a
//! genuine multi-failure aggregate is stored as itself, with each member
//! listed in its diagnostic text.

use std::error::Error;

use crate::value::{Document, Value};

/// Snapshot of an error attached to a log event.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionInfo {
    message: String,
    type_name: String,
    text: Option<String>,
    hresult: i32,
    source: Option<String>,
    error_code: Option<i32>,
    method_name: Option<String>,
    module_name: Option<String>,
    module_version: Option<String>,
    cause: Option<Box<ExceptionInfo>>,
    aggregated: Vec<ExceptionInfo>,
}

impl ExceptionInfo {
    /// Create a snapshot from a type name and message.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: type_name.into(),
            text: None,
            hresult: 0,
            source: None,
            error_code: None,
            method_name: None,
            module_name: None,
            module_version: None,
            cause: None,
            aggregated: Vec::new(),
        }
    }

    /// Bundle several independent failures into one aggregate.
    pub fn aggregate(members: impl IntoIterator<Item = ExceptionInfo>) -> Self {
        let members: Vec<ExceptionInfo> = members.into_iter().collect();
        let mut info = Self::new("AggregateError", format!("{} errors occurred", members.len()));
        info.aggregated = members;
        info
    }

    /// Capture a standard error, walking its `source()` chain into cause
    /// links. An I/O error contributes its OS error code.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + 'static,
    {
        let mut info = Self::new(std::any::type_name::<E>(), error.to_string());
        let dyn_error: &(dyn Error + 'static) = error;
        if let Some(io_error) = dyn_error.downcast_ref::<std::io::Error>()
            && let Some(code) = io_error.raw_os_error()
        {
            info.error_code = Some(code);
        }
        let mut messages = Vec::new();
        let mut source = error.source();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        let mut chain: Option<Box<ExceptionInfo>> = None;
        for message in messages.into_iter().rev() {
            let mut cause = Self::new("", message);
            cause.cause = chain.take();
            chain = Some(Box::new(cause));
        }
        info.cause = chain;
        info
    }

    /// Override the diagnostic text. When unset, a rendering of the cause
    /// chain is produced at serialization time.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_hresult(mut self, hresult: i32) -> Self {
        self.hresult = hresult;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_error_code(mut self, code: i32) -> Self {
        self.error_code = Some(code);
        self
    }

    pub fn with_method_name(mut self, method: impl Into<String>) -> Self {
        self.method_name = Some(method.into());
        self
    }

    pub fn with_module_name(mut self, module: impl Into<String>) -> Self {
        self.module_name = Some(module.into());
        self
    }

    pub fn with_module_version(mut self, version: impl Into<String>) -> Self {
        self.module_version = Some(version.into());
        self
    }

    pub fn with_cause(mut self, cause: ExceptionInfo) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_aggregate(&self) -> bool {
        !self.aggregated.is_empty()
    }

    /// Innermost failure, following cause links.
    pub fn root_cause(&self) -> &ExceptionInfo {
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            current = cause;
        }
        current
    }

    /// Non-aggregate leaves of an aggregate, depth-first, order preserved.
    fn flattened(&self) -> Vec<&ExceptionInfo> {
        let mut flat = Vec::new();
        let mut stack: Vec<&ExceptionInfo> = self.aggregated.iter().rev().collect();
        while let Some(member) = stack.pop() {
            if member.is_aggregate() {
                stack.extend(member.aggregated.iter().rev());
            } else {
                flat.push(member);
            }
        }
        flat
    }

    /// `Type: message`, or the bare message when no type name is known.
    fn heading(&self) -> String {
        if self.type_name.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.type_name, self.message)
        }
    }

    fn render_text(&self) -> String {
        let mut text = self.heading();
        let mut cause = self.cause.as_deref();
        while let Some(inner) = cause {
            text.push_str(" ---> ");
            text.push_str(&inner.heading());
            cause = inner.cause.as_deref();
        }
        text
    }

    fn render_aggregate_text(&self, members: &[&ExceptionInfo]) -> String {
        let mut text = self.heading();
        for (index, member) in members.iter().enumerate() {
            text.push_str(&format!(" ---> (inner #{index}) {}", member.render_text()));
        }
        text
    }

    fn to_document(&self, base_message: String, text: String) -> Document {
        let mut doc = Document::new();
        doc.insert("Message", Value::String(self.message.clone()));
        doc.insert("BaseMessage", Value::String(base_message));
        doc.insert("Text", Value::String(text));
        doc.insert("Type", Value::String(self.type_name.clone()));
        if let Some(code) = self.error_code {
            doc.insert("ErrorCode", Value::Int(code.into()));
        }
        doc.insert("HResult", Value::Int(self.hresult.into()));
        doc.insert("Source", Value::String(self.source.clone().unwrap_or_default()));
        if let Some(method) = &self.method_name {
            doc.insert("MethodName", Value::String(method.clone()));
        }
        if let Some(module) = &self.module_name {
            doc.insert("ModuleName", Value::String(module.clone()));
        }
        if let Some(version) = &self.module_version {
            doc.insert("ModuleVersion", Value::String(version.clone()));
        }
        doc
    }
}

/// Serialize an exception snapshot into the nested document stored in the
/// `Exception` column.
///
/// An aggregate whose flattened members boil down to one failure is
/// serialized as that failure. A multi-failure aggregate is serialized as
/// itself: its own message doubles as `BaseMessage` and every member appears
/// in `Text`.
pub fn serialize_exception(exception: &ExceptionInfo) -> Document {
    if exception.is_aggregate() {
        let flat = exception.flattened();
        if flat.len() == 1 {
            return serialize_exception(flat[0]);
        }
        let text = exception
            .text
            .clone()
            .unwrap_or_else(|| exception.render_aggregate_text(&flat));
        return exception.to_document(exception.message.clone(), text);
    }
    let base_message = exception.root_cause().message.clone();
    let text = exception
        .text
        .clone()
        .unwrap_or_else(|| exception.render_text());
    exception.to_document(base_message, text)
}

#[cfg(test)]
#[path = "exception_test.rs"]
mod exception_test;
