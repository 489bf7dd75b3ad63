//! Prediction request flow: Idle → Pending → Success | Error, and back.
//!
//! [`PredictionFlow`] owns the form and the current [`FlowState`]. The state
//! is a plain view-model; [`PredictionFlow::render`] projects it to terminal
//! text.

use colored::Colorize;

use super::form::PredictionForm;
use crate::api::{FetchError, Prediction, PredictionRequest, PredictionResult, PredictionService};
use crate::dashboard::charts::{Rgb, paint};

/// Instructional text shown while the flow is idle.
pub const PLACEHOLDER: &str = "Enter login data and submit to analyze for anomalies.";

/// Shown while a request is in flight.
pub const LOADING_MESSAGE: &str = "Analyzing login data...";

/// Error text for transport failures and malformed responses.
pub const GENERIC_FAILURE: &str = "Failed to analyze login data. Please try again.";

/// Bar fill when the outcome is anomalous.
pub const ANOMALY_FILL: &str = "#00ff9d";
/// Bar fill when the outcome is normal.
pub const NORMAL_FILL: &str = "#00f3ff";

const BAR_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

/// Two-segment probability bar: the normal share first, the remainder after.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    /// `probability_normal * 100`.
    pub normal_pct: f64,
    pub fill: &'static str,
}

impl ProbabilityBar {
    /// Number of filled cells out of `width`, clamped to the bar.
    pub fn filled_cells(&self, width: usize) -> usize {
        let share = (self.normal_pct / 100.0).clamp(0.0, 1.0);
        ((share * width as f64).round() as usize).min(width)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    /// `"Anomaly Detected"` or `"Normal Login"`.
    pub label: &'static str,
    /// `"anomaly"` or `"normal"`.
    pub style_tag: &'static str,
    pub confidence: String,
    pub bar: ProbabilityBar,
    pub normal_value: String,
    pub anomaly_value: String,
}

impl ResultCard {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        let (label, style_tag, dominant, fill) = if prediction.anomaly {
            (
                "Anomaly Detected",
                "anomaly",
                prediction.probability_anomaly,
                ANOMALY_FILL,
            )
        } else {
            (
                "Normal Login",
                "normal",
                prediction.probability_normal,
                NORMAL_FILL,
            )
        };

        Self {
            label,
            style_tag,
            confidence: format_percent(dominant),
            bar: ProbabilityBar {
                normal_pct: prediction.probability_normal * 100.0,
                fill,
            },
            normal_value: format_percent(prediction.probability_normal),
            anomaly_value: format_percent(prediction.probability_anomaly),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.style_tag == "anomaly"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCard {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle { placeholder: String },
    Pending {
        message: String,
        request: PredictionRequest,
    },
    Success(ResultCard),
    Error(ErrorCard),
}

impl FlowState {
    fn idle() -> Self {
        Self::Idle {
            placeholder: PLACEHOLDER.to_string(),
        }
    }

    /// Success or Error.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    /// The probability bar, present only on success.
    pub fn bar(&self) -> Option<&ProbabilityBar> {
        match self {
            Self::Success(card) => Some(&card.bar),
            _ => None,
        }
    }
}

/// `0.8` → `"80.00%"`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PredictionFlow {
    form: PredictionForm,
    state: FlowState,
}

impl Default for PredictionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionFlow {
    /// Idle, with the default form.
    pub fn new() -> Self {
        Self::with_form(PredictionForm::with_defaults())
    }

    pub fn with_form(form: PredictionForm) -> Self {
        Self {
            form,
            state: FlowState::idle(),
        }
    }

    pub fn form(&self) -> &PredictionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PredictionForm {
        &mut self.form
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Encode the form and enter Pending. Returns the request to send.
    pub fn begin_submit(&mut self) -> PredictionRequest {
        let request = self.form.to_request();
        self.state = FlowState::Pending {
            message: LOADING_MESSAGE.to_string(),
            request: request.clone(),
        };
        request
    }

    /// Resolve a pending submission.
    ///
    /// Returns `false` and leaves the state alone when nothing is pending,
    /// e.g. the flow was reset while the request was in flight.
    pub fn complete(&mut self, outcome: Result<PredictionResult, FetchError>) -> bool {
        if !matches!(self.state, FlowState::Pending { .. }) {
            return false;
        }

        self.state = match outcome {
            Ok(PredictionResult::Outcome(prediction)) => {
                FlowState::Success(ResultCard::from_prediction(&prediction))
            }
            Ok(PredictionResult::Failure { error }) => FlowState::Error(ErrorCard { message: error }),
            Err(FetchError::Application(message)) => FlowState::Error(ErrorCard { message }),
            Err(FetchError::Transport(_) | FetchError::Malformed(_)) => {
                FlowState::Error(ErrorCard {
                    message: GENERIC_FAILURE.to_string(),
                })
            }
        };
        true
    }

    /// Submit the current form to `service` and resolve the result.
    pub fn submit(&mut self, service: &impl PredictionService) -> &FlowState {
        let request = self.begin_submit();
        let outcome = service.predict(&request);
        self.complete(outcome);
        &self.state
    }

    /// Back to Idle: default form, fresh timestamp, placeholder text.
    pub fn reset(&mut self) {
        self.form.clear();
        self.state = FlowState::idle();
    }

    // -- Projection --

    /// Render the current state as terminal text.
    pub fn render(&self, color: bool) -> String {
        match &self.state {
            FlowState::Idle { placeholder } => dim(placeholder, color),
            FlowState::Pending { message, .. } => dim(message, color),
            FlowState::Success(card) => render_card(card, color),
            FlowState::Error(card) => {
                let heading = if color {
                    "Error".red().bold().to_string()
                } else {
                    "Error".to_string()
                };
                format!("{heading}\n  {}", card.message)
            }
        }
    }
}

fn render_card(card: &ResultCard, color: bool) -> String {
    let label = match (card.is_anomaly(), color) {
        (true, true) => card.label.red().bold().to_string(),
        (false, true) => card.label.green().bold().to_string(),
        (_, false) => card.label.to_string(),
    };

    let filled = card.bar.filled_cells(BAR_WIDTH);
    let fill_rgb = Rgb::from_hex(card.bar.fill).unwrap_or(Rgb(255, 255, 255));
    let bar = format!(
        "{}{}",
        paint(&"█".repeat(filled), fill_rgb, color),
        dim(&"░".repeat(BAR_WIDTH - filled), color),
    );

    [
        label,
        format!("  Confidence: {}", card.confidence),
        format!("  Normal [{bar}] Anomaly"),
        format!(
            "  Normal: {}   Anomaly: {}",
            card.normal_value, card.anomaly_value
        ),
    ]
    .join("\n")
}

fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned(RefCell<Option<Result<PredictionResult, FetchError>>>);

    impl Canned {
        fn new(outcome: Result<PredictionResult, FetchError>) -> Self {
            Self(RefCell::new(Some(outcome)))
        }
    }

    impl PredictionService for Canned {
        fn predict(&self, _request: &PredictionRequest) -> Result<PredictionResult, FetchError> {
            self.0
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Err(FetchError::Transport("exhausted".to_string())))
        }
    }

    fn outcome(anomaly: bool, normal: f64, anom: f64) -> PredictionResult {
        PredictionResult::Outcome(Prediction {
            anomaly,
            probability_normal: normal,
            probability_anomaly: anom,
        })
    }

    #[test]
    fn starts_idle_with_placeholder() {
        let flow = PredictionFlow::new();
        assert_eq!(
            flow.state(),
            &FlowState::Idle {
                placeholder: PLACEHOLDER.to_string()
            }
        );
        assert_eq!(flow.render(false), PLACEHOLDER);
    }

    #[test]
    fn begin_submit_enters_pending() {
        let mut flow = PredictionFlow::with_form(PredictionForm::from_pairs([("login_hour", "3")]));
        let request = flow.begin_submit();

        assert_eq!(request.get("login_hour"), Some(&serde_json::json!(3)));
        assert!(matches!(flow.state(), FlowState::Pending { message, .. } if message == LOADING_MESSAGE));
        assert_eq!(flow.render(false), LOADING_MESSAGE);
    }

    #[test]
    fn anomaly_result_card() {
        let mut flow = PredictionFlow::new();
        let service = Canned::new(Ok(outcome(true, 0.2, 0.8)));

        let FlowState::Success(card) = flow.submit(&service) else {
            panic!("expected success");
        };
        assert_eq!(card.label, "Anomaly Detected");
        assert_eq!(card.style_tag, "anomaly");
        assert_eq!(card.confidence, "80.00%");
        assert_eq!(card.bar.fill, ANOMALY_FILL);
        assert!((card.bar.normal_pct - 20.0).abs() < 1e-9);
        assert_eq!(card.normal_value, "20.00%");
        assert_eq!(card.anomaly_value, "80.00%");
    }

    #[test]
    fn normal_result_card() {
        let card = ResultCard::from_prediction(&Prediction {
            anomaly: false,
            probability_normal: 0.93461,
            probability_anomaly: 0.06539,
        });
        assert_eq!(card.label, "Normal Login");
        assert_eq!(card.confidence, "93.46%");
        assert_eq!(card.bar.fill, NORMAL_FILL);
        assert_eq!(card.bar.filled_cells(40), 37);
    }

    #[test]
    fn application_error_shown_verbatim_without_bar() {
        let mut flow = PredictionFlow::new();
        let service = Canned::new(Ok(PredictionResult::Failure {
            error: "model unavailable".to_string(),
        }));

        let state = flow.submit(&service);
        assert_eq!(
            state,
            &FlowState::Error(ErrorCard {
                message: "model unavailable".to_string()
            })
        );
        assert!(state.bar().is_none());
        assert!(flow.render(false).contains("model unavailable"));
        assert!(!flow.render(false).contains('█'));
    }

    #[test]
    fn transport_and_malformed_use_generic_message() {
        for err in [
            FetchError::Transport("connection refused".to_string()),
            FetchError::Malformed("missing field probability_normal".to_string()),
        ] {
            let mut flow = PredictionFlow::new();
            flow.begin_submit();
            flow.complete(Err(err));
            assert_eq!(
                flow.state(),
                &FlowState::Error(ErrorCard {
                    message: GENERIC_FAILURE.to_string()
                })
            );
        }

        let mut flow = PredictionFlow::new();
        flow.begin_submit();
        flow.complete(Err(FetchError::Application("bad input".to_string())));
        assert!(matches!(flow.state(), FlowState::Error(card) if card.message == "bad input"));
    }

    #[test]
    fn reset_returns_to_idle_and_clears_form() {
        let mut flow = PredictionFlow::new();
        flow.form_mut().set("user_id", "U1");
        flow.submit(&Canned::new(Ok(outcome(false, 0.9, 0.1))));
        assert!(flow.state().is_resolved());

        flow.reset();
        assert!(matches!(flow.state(), FlowState::Idle { .. }));
        assert_eq!(flow.form().get("user_id"), Some(""));
        assert!(!flow.form().get("timestamp").unwrap().is_empty());
    }

    #[test]
    fn late_completion_after_reset_is_ignored() {
        let mut flow = PredictionFlow::new();
        flow.begin_submit();
        flow.reset();

        assert!(!flow.complete(Ok(outcome(true, 0.1, 0.9))));
        assert!(matches!(flow.state(), FlowState::Idle { .. }));
    }

    #[test]
    fn resubmit_after_error() {
        let mut flow = PredictionFlow::new();
        flow.submit(&Canned::new(Err(FetchError::Transport("down".to_string()))));
        assert!(matches!(flow.state(), FlowState::Error(_)));

        flow.submit(&Canned::new(Ok(outcome(false, 0.7, 0.3))));
        assert!(matches!(flow.state(), FlowState::Success(_)));
    }

    #[test]
    fn render_success_card() {
        let mut flow = PredictionFlow::new();
        flow.submit(&Canned::new(Ok(outcome(true, 0.25, 0.75))));
        let text = flow.render(false);

        assert!(text.starts_with("Anomaly Detected"));
        assert!(text.contains("Confidence: 75.00%"));
        assert!(text.contains(&format!("[{}{}]", "█".repeat(10), "░".repeat(30))));
        assert!(text.contains("Normal: 25.00%   Anomaly: 75.00%"));
    }

    #[test]
    fn bar_clamps_out_of_range() {
        let bar = ProbabilityBar {
            normal_pct: 140.0,
            fill: NORMAL_FILL,
        };
        assert_eq!(bar.filled_cells(40), 40);
        let bar = ProbabilityBar {
            normal_pct: -5.0,
            fill: NORMAL_FILL,
        };
        assert_eq!(bar.filled_cells(40), 0);
    }
}
