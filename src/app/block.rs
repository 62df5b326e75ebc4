//! Pre-built configuration blocks mounted as layers.

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;

use crate::conf::{split_arguments, Argument, Conf, DirectiveSink};
use crate::dispatch::{Context, Flow, Handler};
use crate::error::Result;

/// Replays a block's file and arguments into the sink being built.
///
/// The arguments are split into flags once, at registration.
#[derive(Debug, Clone)]
pub struct BlockHandler {
    file: Option<PathBuf>,
    arguments: Vec<Argument>,
}

impl BlockHandler {
    pub fn new(block: &Conf) -> Result<Self> {
        Ok(Self {
            file: block.file().map(Path::to_path_buf),
            arguments: split_arguments(block.arguments().as_slice())?,
        })
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn apply(&self, cx: &mut Context<'_>) -> Result<()> {
        // the first block that names a file wins
        if cx.sink().file().is_none() {
            if let Some(file) = &self.file {
                cx.sink().set_file(file.clone())?;
            }
        }
        for arg in &self.arguments {
            match (arg.flag.as_str(), arg.value.as_deref()) {
                ("-D", Some(parameter)) => cx.define(parameter)?,
                (flag, value) => cx.add_argument(flag, value)?,
            }
        }
        Ok(())
    }
}

impl Handler for BlockHandler {
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>> {
        let result = self.apply(cx).map(|()| Flow::Next);
        Box::pin(std::future::ready(result))
    }

    fn name(&self) -> &str {
        "block"
    }
}
