//! The declared stage sequence. Each `Stage` names the state-store keys it
//! reads and writes; `ORDERED_STAGES` is the strict serial order the
//! pipeline runs them in, matching their declared dependencies
//! (`ExtractSourceSchemas` before `CreateTargetSchemas`, both stub stages
//! before either implementation stage, everything before `VerifyAll`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ExtractSourceSchemas,
    CreateTargetSchemas,
    ExtractSourceTypes,
    CreateTargetTypes,
    ExtractSourceTables,
    CreateTargetTables,
    ExtractSourceConstraints,
    CreateTargetConstraints,
    CreateFkIndexes,
    ExtractSourceViews,
    CreateViewStubs,
    ExtractSourceRoutines,
    CreateRoutineStubs,
    ImplementViews,
    ImplementRoutines,
    VerifyAll,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::ExtractSourceSchemas => "ExtractSourceSchemas",
            Stage::CreateTargetSchemas => "CreateTargetSchemas",
            Stage::ExtractSourceTypes => "ExtractSourceTypes",
            Stage::CreateTargetTypes => "CreateTargetTypes",
            Stage::ExtractSourceTables => "ExtractSourceTables",
            Stage::CreateTargetTables => "CreateTargetTables",
            Stage::ExtractSourceConstraints => "ExtractSourceConstraints",
            Stage::CreateTargetConstraints => "CreateTargetConstraints",
            Stage::CreateFkIndexes => "CreateFKIndexes",
            Stage::ExtractSourceViews => "ExtractSourceViews",
            Stage::CreateViewStubs => "CreateViewStubs",
            Stage::ExtractSourceRoutines => "ExtractSourceRoutines",
            Stage::CreateRoutineStubs => "CreateRoutineStubs",
            Stage::ImplementViews => "ImplementViews",
            Stage::ImplementRoutines => "ImplementRoutines",
            Stage::VerifyAll => "VerifyAll",
        }
    }
}

/// Strict serial order. Data copy sits between `CreateTargetTables` and
/// `ExtractSourceConstraints` in the declared dependency list but is an
/// external collaborator, not a stage this pipeline runs.
pub const ORDERED_STAGES: &[Stage] = &[
    Stage::ExtractSourceSchemas,
    Stage::CreateTargetSchemas,
    Stage::ExtractSourceTypes,
    Stage::CreateTargetTypes,
    Stage::ExtractSourceTables,
    Stage::CreateTargetTables,
    Stage::ExtractSourceConstraints,
    Stage::CreateTargetConstraints,
    Stage::CreateFkIndexes,
    Stage::ExtractSourceViews,
    Stage::CreateViewStubs,
    Stage::ExtractSourceRoutines,
    Stage::CreateRoutineStubs,
    Stage::ImplementViews,
    Stage::ImplementRoutines,
    Stage::VerifyAll,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_stages_precede_implementation_stages() {
        let pos = |s: Stage| ORDERED_STAGES.iter().position(|&x| x == s).unwrap();
        assert!(pos(Stage::CreateViewStubs) < pos(Stage::ImplementViews));
        assert!(pos(Stage::CreateRoutineStubs) < pos(Stage::ImplementRoutines));
        assert!(pos(Stage::ImplementViews) < pos(Stage::VerifyAll));
        assert!(pos(Stage::ImplementRoutines) < pos(Stage::VerifyAll));
    }

    #[test]
    fn constraint_stages_run_in_declared_order() {
        let pos = |s: Stage| ORDERED_STAGES.iter().position(|&x| x == s).unwrap();
        assert!(pos(Stage::CreateTargetConstraints) < pos(Stage::CreateFkIndexes));
    }
}
