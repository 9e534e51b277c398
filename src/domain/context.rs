/// Execution context supplied by the host orchestrator for one build.
///
/// `service` is the display name embedded in distribution comments;
/// `stage` and `region` select which configuration branches apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContext {
    pub service: String,
    pub stage: String,
    pub region: String,
}

impl DeployContext {
    pub fn new<S: Into<String>>(service: S, stage: S, region: S) -> Self {
        Self { service: service.into(), stage: stage.into(), region: region.into() }
    }
}
