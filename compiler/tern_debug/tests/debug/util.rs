//! Shared helpers for debug info integration tests.

use std::sync::Arc;

use tern_debug::{CompilationContext, MetadataModule, MetadataNode, MetadataValue};
use tern_session::{AbiVersion, DebugLevel, SessionConfig};

/// Context for `target` writing to `output` at `level`.
#[must_use]
pub fn context(target: &str, level: DebugLevel, output: &str) -> CompilationContext<MetadataModule> {
    tern_session::init_tracing();
    let config = SessionConfig::new(AbiVersion::CURRENT)
        .with_target(target)
        .with_debug_level(level)
        .with_output_path(output);
    CompilationContext::for_target(Arc::new(config), MetadataModule::new())
        .unwrap_or_else(|e| panic!("failed to build context for {target}: {e}"))
}

/// Keys of the flags attached under `llvm.module.flags`, in order.
#[must_use]
pub fn flag_keys(module: &MetadataModule) -> Vec<String> {
    let Some(flags) = module.named_metadata("llvm.module.flags") else {
        return Vec::new();
    };
    flags
        .iter()
        .filter_map(|id| match module.node(*id) {
            Some(MetadataNode::Tuple(values)) => match values.get(1) {
                Some(MetadataValue::String(key)) => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
