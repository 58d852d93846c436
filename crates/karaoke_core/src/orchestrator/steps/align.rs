//! Align step - forced alignment of the transcript to the vocal stem.
//!
//! Stages the resampled vocals and the transcript in the aligner's input
//! directory, makes sure the language's dictionary and acoustic model are
//! installed, runs the aligner, converts its TextGrid into a lyrics
//! document and finally runs pitch annotation over that document.

use std::path::Path;

use crate::alignment::convert_textgrid;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::{Checkpoints, PipelineStep};
use crate::orchestrator::types::{AlignmentOutput, Context, SessionState};
use crate::workspace::{relocate_file, replace_copy};

use super::require_output;

pub struct AlignStep;

impl AlignStep {
    pub fn new() -> Self {
        Self
    }

    /// Move the vocals and copy the transcript into the aligner input dir.
    ///
    /// Stale files of the same name are replaced.
    fn stage_inputs(&self, ctx: &Context, vocals: &Path) -> StepResult<()> {
        let audio = ctx.workspace.aligner_audio();
        let transcript = ctx.workspace.aligner_transcript();

        relocate_file(vocals, &audio)
            .map_err(|e| StepError::io("staging vocals for the aligner", e))?;
        replace_copy(&ctx.request.transcript_path, &transcript)
            .map_err(|e| StepError::io("staging transcript for the aligner", e))?;

        ctx.logger.info(&format!(
            "Aligner input: {} + {}",
            audio.display(),
            transcript.display()
        ));
        Ok(())
    }

    /// Check that the profile's models are installed, downloading if allowed.
    fn ensure_models(&self, ctx: &Context) -> StepResult<()> {
        let aligner = &ctx.settings.tools.aligner;
        let models = [
            ("dictionary", ctx.profile.dictionary.as_str()),
            ("acoustic", ctx.profile.acoustic_model.as_str()),
        ];

        for (kind, name) in models {
            let listing = ctx.run_tool(&aligner.invocation().args(["model", "list", kind]))?;
            let installed = listing
                .stdout
                .lines()
                .any(|line| line.split_whitespace().any(|token| token == name));
            if installed {
                continue;
            }

            if !ctx.settings.alignment.download_missing_models {
                return Err(StepError::configuration(format!(
                    "{} model '{}' is not installed (run `mfa model download {} {}` \
                     or set alignment.download_missing_models)",
                    kind, name, kind, name
                )));
            }

            ctx.logger
                .warn(&format!("{} model '{}' not found, downloading", kind, name));
            ctx.run_tool(&aligner.invocation().args(["model", "download", kind, name]))?;
        }

        Ok(())
    }

    fn run_aligner(&self, ctx: &Context) -> StepResult<()> {
        let alignment = &ctx.settings.alignment;
        let mut invocation = ctx
            .settings
            .tools
            .aligner
            .invocation()
            .arg("align")
            .path_arg(&ctx.workspace.aligner_input_dir())
            .arg(&ctx.profile.dictionary)
            .arg(&ctx.profile.acoustic_model)
            .path_arg(&ctx.workspace.aligner_output_dir())
            .args(["--beam", alignment.beam.to_string().as_str()])
            .args(["--retry_beam", alignment.retry_beam.to_string().as_str()]);
        if alignment.clean {
            invocation = invocation.arg("--clean");
        }

        ctx.run_tool(&invocation)?;
        Ok(())
    }

    fn annotate_pitch(&self, ctx: &Context) -> StepResult<()> {
        let ws = &ctx.workspace;
        let invocation = ctx
            .settings
            .tools
            .pitch_annotator
            .invocation()
            .arg(&ctx.settings.tools.pitch_script)
            .path_arg(&ws.lyrics_path())
            .path_arg(&ws.aligner_audio())
            .arg("--output")
            .path_arg(&ws.annotated_lyrics_path())
            .arg("--log")
            .path_arg(&ws.pitch_log_path())
            .arg("--quiet");

        ctx.run_tool(&invocation)?;
        Ok(())
    }
}

impl Default for AlignStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AlignStep {
    fn name(&self) -> &str {
        "align-transcript"
    }

    fn description(&self) -> &str {
        "Align transcript"
    }

    fn checkpoints(&self) -> Checkpoints {
        Checkpoints::around(50, 60)
    }

    fn validate_input(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let stems = state
            .resample
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("stems have not been resampled"))?;
        if !stems.vocals.is_file() {
            return Err(StepError::file_not_found(&stems.vocals));
        }
        if !ctx.request.transcript_path.is_file() {
            return Err(StepError::file_not_found(&ctx.request.transcript_path));
        }
        if !Path::new(&ctx.settings.tools.pitch_script).is_file() {
            return Err(StepError::configuration(format!(
                "pitch analysis script not found: {}",
                ctx.settings.tools.pitch_script
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
        let vocals = state
            .resample
            .as_ref()
            .map(|s| s.vocals.clone())
            .ok_or_else(|| StepError::invalid_input("stems have not been resampled"))?;

        self.stage_inputs(ctx, &vocals)?;
        self.ensure_models(ctx)?;
        self.run_aligner(ctx)?;

        let ws = &ctx.workspace;
        let textgrid = ws.textgrid_path();
        require_output(&ctx.settings.tools.aligner.program, &textgrid)?;

        let document = convert_textgrid(
            &textgrid,
            &ws.aligner_transcript(),
            &ws.lyrics_path(),
            &ctx.profile.code,
        )?;
        let sung: f64 = document.segments.iter().map(|s| s.duration()).sum();
        ctx.logger.info(&format!(
            "Lyrics document: {} segments, {} words, {:.2}s sung",
            document.segments.len(),
            document.word_count(),
            sung
        ));
        if document.segments.is_empty() {
            ctx.logger
                .warn("No transcript line matched an aligned word; lyrics will be empty");
        }

        self.annotate_pitch(ctx)?;

        state.alignment = Some(AlignmentOutput {
            textgrid,
            lyrics: ws.lyrics_path(),
            annotated_lyrics: ws.annotated_lyrics_path(),
            pitch_log: ws.pitch_log_path(),
            segment_count: document.segments.len(),
            word_count: document.word_count(),
        });
        Ok(())
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let output = state
            .alignment
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("alignment not recorded"))?;
        let annotator = &ctx.settings.tools.pitch_annotator.program;
        require_output(annotator, &output.annotated_lyrics)?;
        require_output(annotator, &output.pitch_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LyricsDocument;
    use crate::orchestrator::steps::{EncodeStep, ResampleStep, SeparateStep};
    use crate::orchestrator::test_support::{fake_tools, touch, value_after, TestSession};
    use crate::tools::ToolOutput;
    use std::fs;

    fn encoded(session: &TestSession) -> (Context, SessionState) {
        let ctx = session.context();
        let mut state = SessionState::new(ctx.session_id());
        SeparateStep::new().execute(&ctx, &mut state).unwrap();
        ResampleStep::new().execute(&ctx, &mut state).unwrap();
        EncodeStep::new().execute(&ctx, &mut state).unwrap();
        (ctx, state)
    }

    #[test]
    fn aligns_and_builds_lyrics() {
        let session = TestSession::new();
        let (ctx, mut state) = encoded(&session);

        let step = AlignStep::new();
        step.validate_input(&ctx, &state).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let align = session
            .runner
            .calls_to("mfa")
            .into_iter()
            .find(|c| c.args[0] == "align")
            .unwrap();
        assert_eq!(align.args[2], "vietnamese_mfa");
        assert_eq!(align.args[3], "vietnamese_mfa");
        assert_eq!(
            align.args[5..],
            ["--beam", "100", "--retry_beam", "400", "--clean"]
        );

        let output = state.alignment.unwrap();
        assert_eq!(output.segment_count, 2);
        assert_eq!(output.word_count, 7);

        let doc: LyricsDocument =
            serde_json::from_str(&fs::read_to_string(&output.lyrics).unwrap()).unwrap();
        assert_eq!(doc.language, "vi");
        assert_eq!(doc.text, "xin chao ban hom nay troi dep");
        assert_eq!(doc.segments[0].start, 0.3);
        assert_eq!(doc.segments[1].end, 3.56);
        assert_eq!(doc.segments[1].words[0].end, 2.33);
    }

    #[test]
    fn stages_inputs_for_the_aligner() {
        let session = TestSession::new();
        let (ctx, mut state) = encoded(&session);
        let resampled_vocals = state.resample.as_ref().unwrap().vocals.clone();

        AlignStep::new().execute(&ctx, &mut state).unwrap();

        assert!(!resampled_vocals.exists());
        assert!(ctx.workspace.aligner_audio().is_file());
        assert_eq!(
            fs::read_to_string(ctx.workspace.aligner_transcript()).unwrap(),
            crate::orchestrator::test_support::TRANSCRIPT
        );
        // The caller's transcript stays in place
        assert!(session.request.transcript_path.is_file());

        let python = session.runner.calls_to("python");
        assert_eq!(python.len(), 1);
        assert!(python[0].args[0].ends_with("vocal_pitch_analyzer.py"));
        assert_eq!(python[0].args.last().unwrap(), "--quiet");
    }

    #[test]
    fn missing_model_fails_without_download() {
        let runner = fake_tools().on("mfa", |_| {
            Ok(ToolOutput {
                stdout: "english_us_mfa\n".to_string(),
                ..ToolOutput::default()
            })
        });
        let session = TestSession::with_runner(runner);
        let (ctx, mut state) = encoded(&session);

        let err = AlignStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Configuration(ref m) if m.contains("vietnamese_mfa")));
        assert!(!session
            .runner
            .calls_to("mfa")
            .iter()
            .any(|c| c.args[0] == "align"));
    }

    #[test]
    fn missing_model_is_downloaded_when_allowed() {
        let runner = fake_tools().on("mfa", |inv| {
            Ok(ToolOutput {
                stdout: if inv.args[0] == "model" && inv.args[1] == "list" {
                    "english_mfa\n".to_string()
                } else {
                    String::new()
                },
                ..ToolOutput::default()
            })
        });
        let mut session = TestSession::with_runner(runner);
        session.settings.alignment.download_missing_models = true;
        let (ctx, mut state) = encoded(&session);

        // The aligner never writes a TextGrid in this fake
        let err = AlignStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::MissingOutput { .. }));

        let downloads: Vec<_> = session
            .runner
            .calls_to("mfa")
            .into_iter()
            .filter(|c| c.args[1] == "download")
            .map(|c| c.args[2..].to_vec())
            .collect();
        assert_eq!(
            downloads,
            vec![
                vec!["dictionary".to_string(), "vietnamese_mfa".to_string()],
                vec!["acoustic".to_string(), "vietnamese_mfa".to_string()],
            ]
        );
    }

    #[test]
    fn similarly_named_model_does_not_count_as_installed() {
        let runner = fake_tools().on("mfa", |_| {
            Ok(ToolOutput {
                stdout: "vietnamese_mfa_v2\nenglish_mfa\n".to_string(),
                ..ToolOutput::default()
            })
        });
        let session = TestSession::with_runner(runner);
        let (ctx, mut state) = encoded(&session);

        let err = AlignStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Configuration(ref m) if m.contains("vietnamese_mfa")));
    }

    #[test]
    fn missing_pitch_log_fails_output_check() {
        let runner = fake_tools().on("python", |inv| {
            let lyrics = fs::read_to_string(&inv.args[1]).unwrap();
            touch(std::path::Path::new(value_after(inv, "--output")), &lyrics);
            Ok(ToolOutput::default())
        });
        let session = TestSession::with_runner(runner);
        let (ctx, mut state) = encoded(&session);

        let step = AlignStep::new();
        step.execute(&ctx, &mut state).unwrap();
        let err = step.validate_output(&ctx, &state).unwrap_err();
        assert!(
            matches!(err, StepError::MissingOutput { ref tool, ref path } if tool == "python" && path.ends_with("pitch_analysis_log.json"))
        );
    }

    #[test]
    fn aligner_failure_is_a_tool_error() {
        let session = TestSession::with_runner(fake_tools().failing("mfa", 1, "align crashed"));
        let (ctx, mut state) = encoded(&session);

        let err = AlignStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Tool(_)));
        assert!(ctx.logger.tail().iter().any(|l| l.contains("align crashed")));
    }

    #[test]
    fn missing_pitch_script_is_configuration_error() {
        let mut session = TestSession::new();
        session.settings.tools.pitch_script = "/nonexistent/pitch.py".to_string();
        let (ctx, state) = encoded(&session);

        let err = AlignStep::new().validate_input(&ctx, &state).unwrap_err();
        assert!(matches!(err, StepError::Configuration(_)));
    }
}
