pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_script, insertion_for, replacement_for, ApplicationError, ScriptOutcome, StepResult};
pub use loader::{load_config, load_from_path, load_from_str, load_script, ConfigError, Validate};
pub use schema::{
    DiagnosticsSettings, EditScript, MutationSettings, Operation, OutputSettings, ScriptMetadata,
    Step, SurgeonConfig, ValidationError, ValidationIssue,
};

use crate::diagnostics::ExtractorOptions;
use crate::mutation::{MutationEngine, ReplacementPolicy};

impl SurgeonConfig {
    pub fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            context_radius: self.diagnostics.context_radius,
            reposition: self.diagnostics.reposition_unexpected_code,
        }
    }

    pub fn engine(&self) -> MutationEngine {
        MutationEngine::new(ReplacementPolicy {
            allow_item_swap: self.mutation.allow_item_swap,
        })
    }
}
