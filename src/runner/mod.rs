use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;

use crate::funnel::{FunnelEvent, FunnelView};
use crate::models::{Participant, QuizResult, StyleInfo};
use crate::session::QuizSession;
use crate::styles;

const TRANSITION_PAUSE: Duration = Duration::from_millis(600);

/// What the input thread needs to translate a typed number into a pick.
#[derive(Debug, Clone)]
struct Prompt {
    question_id: String,
    option_ids: Vec<String>,
}

/// Renders the funnel on stdout and feeds typed commands back as events.
/// Numbers toggle options of the question on screen, 'n' proceeds, 'r'
/// retakes and 'q' quits.
pub struct TerminalView {
    prompt: Arc<Mutex<Option<Prompt>>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Reads stdin on a plain thread and forwards parsed commands. The
    /// thread winds down once the event channel closes.
    pub fn spawn_input_thread(&self, events: Sender<FunnelEvent>) {
        let prompt = Arc::clone(&self.prompt);
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let Some(event) = parse_command(line.trim(), &prompt) else {
                    continue;
                };
                if events.blocking_send(event).is_err() {
                    break;
                }
            }
            debug!("input thread finished");
        });
    }

    fn set_prompt(&self, prompt: Option<Prompt>) {
        if let Ok(mut guard) = self.prompt.lock() {
            *guard = prompt;
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend-provided description when there is one, built-in catalog
/// otherwise.
fn describe_category<'a>(category: &str, styles: &'a [StyleInfo]) -> Option<&'a str> {
    styles
        .iter()
        .find(|s| s.category == category)
        .and_then(|s| s.description.as_deref())
        .or_else(|| styles::describe(category))
}

fn parse_command(input: &str, prompt: &Mutex<Option<Prompt>>) -> Option<FunnelEvent> {
    match input {
        "" => None,
        "q" | "quit" => Some(FunnelEvent::Quit),
        "n" | "next" => Some(FunnelEvent::Proceed),
        "r" | "retake" => Some(FunnelEvent::Retake),
        _ => {
            let number: usize = match input.parse() {
                Ok(n) => n,
                Err(_) => {
                    println!("Unknown command '{}'. Numbers pick options, 'n' proceeds, 'r' retakes, 'q' quits.", input);
                    return None;
                }
            };
            let guard = prompt.lock().ok()?;
            let prompt = guard.as_ref()?;
            let option_id = prompt.option_ids.get(number.checked_sub(1)?)?;
            Some(FunnelEvent::Toggle {
                question_id: prompt.question_id.clone(),
                option_id: option_id.clone(),
            })
        }
    }
}

#[async_trait]
impl FunnelView for TerminalView {
    async fn show_question(&self, session: &QuizSession) {
        let question = session.current_question();
        let total = session.quiz().questions.len();

        println!();
        println!(
            "--- Question {} of {} ---",
            session.current_index() + 1,
            total
        );
        println!("{}", question.text);
        for (i, option) in question.options.iter().enumerate() {
            let mark = if session.is_selected(&option.id) {
                "x"
            } else {
                " "
            };
            println!("  [{}] {}. {}", mark, i + 1, option.text);
        }
        let hint = if question.is_strategic() {
            "pick one option, then 'n' to continue".to_string()
        } else {
            format!(
                "picked {} of {}; the quiz continues automatically",
                session.selected_count(),
                question.requirement()
            )
        };
        println!("({})", hint);

        self.set_prompt(Some(Prompt {
            question_id: question.id.clone(),
            option_ids: question.options.iter().map(|o| o.id.clone()).collect(),
        }));
    }

    async fn show_transition(&self, from_question: usize) {
        // Stale numbers must not map onto the question being left
        self.set_prompt(None);
        debug!("transition after question {}", from_question);
        println!();
        println!("  Answer recorded.");
        sleep(TRANSITION_PAUSE).await;
    }

    async fn show_result(&self, result: &QuizResult, styles: &[StyleInfo]) {
        self.set_prompt(None);

        println!();
        println!("=== Your style ===");
        println!(
            "{} - {:.0}% ({} points)",
            result.primary_style.category,
            result.primary_style.percentage,
            result.primary_style.score
        );
        if let Some(description) = describe_category(&result.primary_style.category, styles) {
            println!("{}", description);
        }

        if !result.secondary_styles.is_empty() {
            println!();
            println!("Secondary styles:");
            for style in &result.secondary_styles {
                println!(
                    "  {} - {:.0}% ({} points)",
                    style.category, style.percentage, style.score
                );
            }
        }
        println!();
        println!("('r' to retake the quiz, 'q' to quit)");
    }

    async fn show_no_result(&self) {
        self.set_prompt(None);
        println!();
        println!("No saved result found. Answer the quiz to discover your style.");
    }
}

/// Collects participant data before the quiz starts. Values provided via
/// environment skip the interactive prompts.
pub fn ask_participant(name: Option<String>, email: Option<String>) -> Participant {
    if let Some(name) = name {
        return Participant { name, email };
    }

    let name = read_prompted("Before we start, what is your name?")
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Visitante".to_string());
    let email = email.or_else(|| read_prompted("Email (optional, enter to skip):"));

    Participant { name, email }
}

fn read_prompted(prompt: &str) -> Option<String> {
    println!("{}", prompt);
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_for(question_id: &str, option_ids: &[&str]) -> Mutex<Option<Prompt>> {
        Mutex::new(Some(Prompt {
            question_id: question_id.to_string(),
            option_ids: option_ids.iter().map(|s| s.to_string()).collect(),
        }))
    }

    #[test]
    fn numbers_map_to_options_of_the_prompted_question() {
        let prompt = prompt_for("q1", &["a", "b", "c"]);

        assert_eq!(
            parse_command("2", &prompt),
            Some(FunnelEvent::Toggle {
                question_id: "q1".to_string(),
                option_id: "b".to_string(),
            })
        );
    }

    #[test]
    fn out_of_range_numbers_are_dropped() {
        let prompt = prompt_for("q1", &["a", "b"]);

        assert_eq!(parse_command("0", &prompt), None);
        assert_eq!(parse_command("3", &prompt), None);
    }

    #[test]
    fn numbers_without_a_question_on_screen_are_dropped() {
        let prompt = Mutex::new(None);

        assert_eq!(parse_command("1", &prompt), None);
    }

    #[test]
    fn backend_style_description_wins_over_the_catalog() {
        let styles = vec![StyleInfo {
            category: "Sexy".to_string(),
            display_name: None,
            description: Some("Direto do backend".to_string()),
            image_url: None,
        }];

        assert_eq!(describe_category("Sexy", &styles), Some("Direto do backend"));
        // Categories the backend does not describe fall back to the catalog
        assert!(describe_category("Natural", &styles).is_some());
        assert_eq!(describe_category("Desconhecido", &styles), None);
    }

    #[test]
    fn control_commands_do_not_need_a_prompt() {
        let prompt = Mutex::new(None);

        assert_eq!(parse_command("q", &prompt), Some(FunnelEvent::Quit));
        assert_eq!(parse_command("n", &prompt), Some(FunnelEvent::Proceed));
        assert_eq!(parse_command("r", &prompt), Some(FunnelEvent::Retake));
        assert_eq!(parse_command("", &prompt), None);
        assert_eq!(parse_command("xyz", &prompt), None);
    }
}
