//! Error handler executor implementation.
//!
//! Wraps a child executor and reports every row error to a callback instead
//! of failing the query. The failed row is dropped and the next row is
//! pulled from the child. Errors from `init` still propagate.

use crate::access::Row;
use crate::executor::{ColumnInfo, Executor};
use anyhow::{bail, Result};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Callback receiving the row errors of an [`ErrorHandlerExecutor`]
#[derive(Clone)]
pub struct ErrorHandlerFn(Arc<dyn Fn(&anyhow::Error) + Send + Sync>);

impl ErrorHandlerFn {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&anyhow::Error) + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn call(&self, err: &anyhow::Error) {
        (self.0)(err)
    }
}

impl fmt::Debug for ErrorHandlerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorHandlerFn")
    }
}

/// Executor that hands row errors of its child to a handler
pub struct ErrorHandlerExecutor {
    child: Box<dyn Executor>,
    handler: ErrorHandlerFn,
    output_schema: Vec<ColumnInfo>,
    initialized: bool,
}

impl ErrorHandlerExecutor {
    pub fn new(child: Box<dyn Executor>, handler: ErrorHandlerFn) -> Self {
        Self {
            child,
            handler,
            output_schema: Vec::new(),
            initialized: false,
        }
    }
}

impl Executor for ErrorHandlerExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;
        self.output_schema = self.child.output_schema().to_vec();

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        loop {
            match self.child.next() {
                Ok(row) => return Ok(row),
                Err(err) => {
                    debug!("Dropping row after error: {:#}", err);
                    self.handler.call(&err);
                }
            }
        }
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
