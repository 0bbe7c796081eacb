//! Interactive menu: a pure state machine plus the I/O loop around it.
//!
//! Transitions are computed by [`next_state`] from the current state and
//! one input line, with no side effects, so the machine is unit testable.
//! The loop in [`run_menu`] owns all I/O and touches the audio device and
//! the chart viewer only through the [`AudioSink`] and [`ChartRenderer`]
//! capability traits.

use std::io::{BufRead, Write};

use crate::audio::AudioSink;
use crate::charts::{ChartData, ChartRenderer};
use crate::config::{AppConfig, SourceEntry};
use crate::error::Result;
use crate::processing::{AudioSummary, ProcessedSource, filtered_wav_path};
use crate::wav;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Top level: pick a configured source by number.
    SelectSource,
    /// One source is selected; pick an action for it.
    SelectAction { source: usize },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    PlayOriginal,
    PlayFiltered,
    ShowCharts,
}

/// Outcome of feeding one input line to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    /// Input not understood; re-prompt without changing state.
    Stay,
    Transition(MenuState),
    /// Run an action for the selected source; state is unchanged.
    Action { source: usize, action: MenuAction },
}

/// Computes the step for one input line. `0` always exits or returns a
/// level; anything unparseable or out of range is [`MenuStep::Stay`].
pub fn next_state(state: MenuState, input: &str, source_count: usize) -> MenuStep {
    let Ok(choice) = input.trim().parse::<usize>() else {
        return MenuStep::Stay;
    };

    match state {
        MenuState::SelectSource => match choice {
            0 => MenuStep::Transition(MenuState::Exit),
            n if n <= source_count => {
                MenuStep::Transition(MenuState::SelectAction { source: n - 1 })
            }
            _ => MenuStep::Stay,
        },
        MenuState::SelectAction { source } => match choice {
            0 => MenuStep::Transition(MenuState::SelectSource),
            1 => MenuStep::Action {
                source,
                action: MenuAction::PlayOriginal,
            },
            2 => MenuStep::Action {
                source,
                action: MenuAction::PlayFiltered,
            },
            3 => MenuStep::Action {
                source,
                action: MenuAction::ShowCharts,
            },
            _ => MenuStep::Stay,
        },
        MenuState::Exit => MenuStep::Stay,
    }
}

/// Menu text for a state, ending with the prompt line.
pub fn prompt(state: MenuState, sources: &[SourceEntry]) -> String {
    match state {
        MenuState::SelectSource => {
            let mut text = String::from("\nLeak sources:\n");
            for (i, entry) in sources.iter().enumerate() {
                text.push_str(&format!(
                    "  {}) {} ({:.0}-{:.0} Hz)\n",
                    i + 1,
                    entry.name,
                    entry.band_low_hz,
                    entry.band_high_hz
                ));
            }
            text.push_str("  0) Exit\nSelect a source: ");
            text
        }
        MenuState::SelectAction { source } => {
            let name = sources.get(source).map(|e| e.name.as_str()).unwrap_or("?");
            format!(
                "\n{}:\n  1) Play original\n  2) Play filtered\n  3) Show charts\n  0) Back (saves filtered WAV)\nSelect an action: ",
                name
            )
        }
        MenuState::Exit => String::new(),
    }
}

/// Runs the interactive session until exit or end of input.
///
/// Selecting a source runs the processing pipeline on it; a failure there
/// aborts the session. Action failures are printed and the menu continues.
/// Leaving a source's action menu writes the filtered copy next to the
/// source file.
pub fn run_menu<R: BufRead, W: Write>(
    config: &AppConfig,
    input: &mut R,
    output: &mut W,
    sink: &mut dyn AudioSink,
    renderer: &mut dyn ChartRenderer,
) -> Result<()> {
    let mut state = MenuState::SelectSource;
    let mut current: Option<ProcessedSource> = None;

    loop {
        if state == MenuState::Exit {
            return Ok(());
        }

        write!(output, "{}", prompt(state, &config.sources))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // End of input behaves like exit.
            return Ok(());
        }

        match next_state(state, &line, config.sources.len()) {
            MenuStep::Stay => writeln!(output, "Invalid choice.")?,
            MenuStep::Transition(new_state) => {
                match (state, new_state) {
                    (MenuState::SelectSource, MenuState::SelectAction { source }) => {
                        let entry = &config.sources[source];
                        writeln!(output, "Loading {}...", entry.path.display())?;
                        current = Some(ProcessedSource::load(
                            entry,
                            &config.filter,
                            config.downmix,
                        )?);
                    }
                    (MenuState::SelectAction { source }, MenuState::SelectSource) => {
                        if let Some(processed) = current.take() {
                            save_filtered(&config.sources[source], &processed, output)?;
                        }
                    }
                    _ => {}
                }
                state = new_state;
            }
            MenuStep::Action { action, .. } => {
                if let Some(processed) = current.as_ref() {
                    if let Err(e) = run_action(processed, action, config, sink, renderer, output) {
                        writeln!(output, "Error: {}", e)?;
                    }
                }
            }
        }
    }
}

fn save_filtered<W: Write>(
    entry: &SourceEntry,
    processed: &ProcessedSource,
    output: &mut W,
) -> Result<()> {
    let path = filtered_wav_path(&entry.path);
    match wav::save_wav(&path, &processed.filtered, processed.sample_rate()) {
        Ok(()) => writeln!(output, "Saved {}", path.display())?,
        Err(e) => writeln!(output, "Error saving {}: {}", path.display(), e)?,
    }
    Ok(())
}

fn run_action<W: Write>(
    processed: &ProcessedSource,
    action: MenuAction,
    config: &AppConfig,
    sink: &mut dyn AudioSink,
    renderer: &mut dyn ChartRenderer,
    output: &mut W,
) -> Result<()> {
    match action {
        MenuAction::PlayOriginal => {
            writeln!(output, "Playing original...")?;
            sink.play(&processed.original.samples, processed.sample_rate())?;
        }
        MenuAction::PlayFiltered => {
            writeln!(output, "Playing filtered...")?;
            sink.play(&processed.filtered, processed.sample_rate())?;
            let summary = AudioSummary::measure(
                &processed.filtered,
                processed.sample_rate(),
                config.analysis.psd_segment_len,
            )?;
            writeln!(output, "Filtered audio:")?;
            writeln!(output, "{}", summary)?;
        }
        MenuAction::ShowCharts => {
            let data = ChartData::build(
                &processed.name,
                &processed.original.samples,
                &processed.filtered,
                processed.sample_rate(),
                &config.analysis,
            )?;
            renderer.render(&data)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeakError;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_source_selection_transitions() {
        assert_eq!(
            next_state(MenuState::SelectSource, "1\n", 2),
            MenuStep::Transition(MenuState::SelectAction { source: 0 })
        );
        assert_eq!(
            next_state(MenuState::SelectSource, " 2 \n", 2),
            MenuStep::Transition(MenuState::SelectAction { source: 1 })
        );
        assert_eq!(
            next_state(MenuState::SelectSource, "0\n", 2),
            MenuStep::Transition(MenuState::Exit)
        );
    }

    #[test]
    fn test_invalid_input_stays_put() {
        for input in ["3\n", "abc\n", "\n", "-1\n", "1.5\n"] {
            assert_eq!(
                next_state(MenuState::SelectSource, input, 2),
                MenuStep::Stay,
                "input {:?} should not change state",
                input
            );
        }
        assert_eq!(
            next_state(MenuState::SelectAction { source: 0 }, "4\n", 2),
            MenuStep::Stay
        );
    }

    #[test]
    fn test_action_selection() {
        let state = MenuState::SelectAction { source: 1 };
        assert_eq!(
            next_state(state, "1\n", 2),
            MenuStep::Action {
                source: 1,
                action: MenuAction::PlayOriginal
            }
        );
        assert_eq!(
            next_state(state, "2\n", 2),
            MenuStep::Action {
                source: 1,
                action: MenuAction::PlayFiltered
            }
        );
        assert_eq!(
            next_state(state, "3\n", 2),
            MenuStep::Action {
                source: 1,
                action: MenuAction::ShowCharts
            }
        );
        assert_eq!(
            next_state(state, "0\n", 2),
            MenuStep::Transition(MenuState::SelectSource)
        );
    }

    #[test]
    fn test_prompt_lists_sources_and_bands() {
        let config = AppConfig::default();
        let text = prompt(MenuState::SelectSource, &config.sources);
        assert!(text.contains("1) leak_site_1 (700-1500 Hz)"), "{}", text);
        assert!(text.contains("0) Exit"), "{}", text);

        let text = prompt(MenuState::SelectAction { source: 0 }, &config.sources);
        assert!(text.contains("leak_site_1"), "{}", text);
        assert!(text.contains("2) Play filtered"), "{}", text);
    }

    struct RecordingSink {
        calls: Vec<(usize, u32)>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
            self.calls.push((samples.len(), sample_rate));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&mut self, _data: &ChartData) -> Result<()> {
            Err(LeakError::Config("no display".to_string()))
        }
    }

    fn write_test_wav(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "leakscope_menu_{}_{}.wav",
            std::process::id(),
            name
        ));
        let samples: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 8000.0).sin())
            .collect();
        wav::save_wav(&path, &samples, 8000).expect("test WAV should be writable");
        path
    }

    fn test_config(path: PathBuf) -> AppConfig {
        let mut config = AppConfig::default();
        config.sources = vec![SourceEntry {
            name: "test_leak".to_string(),
            path,
            band_low_hz: 600.0,
            band_high_hz: 2200.0,
        }];
        config
    }

    #[test]
    fn test_session_plays_and_saves_on_back() {
        let wav_path = write_test_wav("play_save");
        let config = test_config(wav_path.clone());

        let mut input = Cursor::new("1\n2\n0\n0\n");
        let mut output = Vec::new();
        let mut sink = RecordingSink { calls: Vec::new() };
        let mut renderer = FailingRenderer;

        run_menu(&config, &mut input, &mut output, &mut sink, &mut renderer)
            .expect("session should run to exit");

        assert_eq!(sink.calls.len(), 1, "filtered playback should happen once");
        assert_eq!(sink.calls[0], (8192, 8000));

        let text = String::from_utf8(output).expect("menu output should be UTF-8");
        assert!(text.contains("Dominant frequency"), "{}", text);

        let saved = filtered_wav_path(&wav_path);
        assert!(saved.exists(), "filtered WAV should be saved on back");

        let _ = std::fs::remove_file(&wav_path);
        let _ = std::fs::remove_file(&saved);
    }

    #[test]
    fn test_failed_action_keeps_session_alive() {
        let wav_path = write_test_wav("chart_fail");
        let config = test_config(wav_path.clone());

        // Chart action fails, then playback still works.
        let mut input = Cursor::new("1\n3\n1\n0\n0\n");
        let mut output = Vec::new();
        let mut sink = RecordingSink { calls: Vec::new() };
        let mut renderer = FailingRenderer;

        run_menu(&config, &mut input, &mut output, &mut sink, &mut renderer)
            .expect("session should survive a failing action");

        assert_eq!(sink.calls.len(), 1, "original playback should still run");
        let text = String::from_utf8(output).expect("menu output should be UTF-8");
        assert!(text.contains("no display"), "{}", text);

        let _ = std::fs::remove_file(&wav_path);
        let _ = std::fs::remove_file(filtered_wav_path(&wav_path));
    }

    #[test]
    fn test_invalid_then_exit() {
        let config = AppConfig::default();
        let mut input = Cursor::new("9\nhello\n0\n");
        let mut output = Vec::new();
        let mut sink = RecordingSink { calls: Vec::new() };
        let mut renderer = FailingRenderer;

        run_menu(&config, &mut input, &mut output, &mut sink, &mut renderer)
            .expect("invalid input should only re-prompt");

        let text = String::from_utf8(output).expect("menu output should be UTF-8");
        assert_eq!(text.matches("Invalid choice.").count(), 2);
        assert!(sink.calls.is_empty());
    }
}
