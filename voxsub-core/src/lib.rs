//! voxsub core: synthesis client, audio store, normalization, alignment, pipeline orchestration.

pub mod align;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod protocol;
pub mod runner;
pub mod store;
pub mod synth;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use align::{artifact_path, Aligner};
pub use config::ServiceConfig;
pub use error::{ErrorKind, PipelineError};
pub use model::{AlignmentArtifact, AudioFormat, Segment, StoredAudioReference, SynthesisRequest, SynthesisResult, VoiceType};
pub use normalize::{canonical_path, Normalizer};
pub use pipeline::{Pipeline, PipelineInput, PipelineResult, PipelineState, TextToAudioResult};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use store::AudioStore;
pub use synth::{SynthesisClient, Synthesizer};
