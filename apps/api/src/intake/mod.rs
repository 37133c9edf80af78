// Intake form engine: rule set, deep merge, record invariants and the six-step flow.
// Handlers stay thin; everything they call takes an explicit `&dyn ApplicationStore`.

pub mod applications;
pub mod handlers;
pub mod merge;
pub mod redact;
pub mod rules;
pub mod steps;

#[cfg(test)]
pub mod fixtures;
