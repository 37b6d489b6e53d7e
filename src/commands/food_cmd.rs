use std::sync::Arc;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::config::AppConfig;
use crate::food::analysis::progress::{ANALYSIS_STEPS, LAST_STEP, MAX_PERCENT};
use crate::food::capture::{CaptureBackend, ImageSource, PreprocessOptions, SourceKind};
use crate::food::details::FoodDetails;
use crate::food::error::CaptureError;
use crate::food::handoff::{NavigationParams, Navigator, ANALYSIS_ROUTE, DETAILS_ROUTE};
use crate::food::{AnalysisProgressController, ControllerPhase, NutritionAnalyzer, ProgressTiming};

/// One scan from photo to details view.
pub struct ScanPipeline {
    analyzer: Arc<dyn NutritionAnalyzer>,
    navigator: Arc<dyn Navigator>,
    timing: ProgressTiming,
    preprocess: PreprocessOptions,
    show_progress: bool,
}

impl ScanPipeline {
    pub fn new(
        config: &AppConfig,
        analyzer: Arc<dyn NutritionAnalyzer>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            analyzer,
            navigator,
            timing: config.progress,
            preprocess: config.preprocess,
            show_progress: false,
        }
    }

    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Returns `Ok(None)` when the user cancelled the capture.
    pub async fn scan<B: CaptureBackend>(
        &self,
        backend: B,
        kind: SourceKind,
    ) -> Result<Option<ControllerPhase>, CaptureError> {
        let source = ImageSource::new(backend, self.navigator.clone(), self.preprocess);
        let captured = match kind {
            SourceKind::Camera => source.capture_from_camera().await,
            SourceKind::Library => source.pick_from_library().await,
        };
        let image = match captured {
            Ok(image) => image,
            Err(CaptureError::Cancelled) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut params = NavigationParams::new();
        params.insert("imageUri".to_string(), image.uri.clone());
        self.navigator.push(ANALYSIS_ROUTE, params);

        let controller = AnalysisProgressController::start(
            Some(image),
            self.analyzer.clone(),
            self.navigator.clone(),
            self.timing,
        );

        let phase = if self.show_progress {
            render_progress(&controller).await
        } else {
            controller.wait().await
        };
        Ok(Some(phase))
    }
}

async fn render_progress(controller: &AnalysisProgressController) -> ControllerPhase {
    let bar = ProgressBar::new(MAX_PERCENT as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/white}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(ANALYSIS_STEPS[0]);

    let mut progress = controller.subscribe_progress();
    let mut progress_open = true;
    let wait = controller.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            phase = &mut wait => {
                bar.finish_and_clear();
                return phase;
            }
            changed = progress.changed(), if progress_open => {
                if changed.is_err() {
                    progress_open = false;
                    continue;
                }
                let state = *progress.borrow_and_update();
                bar.set_position(state.percent as u64);
                bar.set_message(ANALYSIS_STEPS[state.step_index.min(LAST_STEP)]);
            }
        }
    }
}

/// Prints navigation to the terminal instead of switching screens.
pub struct TerminalNavigator {
    quantity: i32,
}

impl TerminalNavigator {
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity: quantity.min(i32::MAX as u32) as i32,
        }
    }
}

impl Navigator for TerminalNavigator {
    fn push(&self, route: &str, params: NavigationParams) {
        debug!("push {} {:?}", route, params);
    }

    fn replace(&self, route: &str, params: NavigationParams) {
        if route != DETAILS_ROUTE {
            debug!("replace {} {:?}", route, params);
            return;
        }

        let mut details = FoodDetails::from_params(&params);
        details.change_quantity(self.quantity - 1);
        let totals = details.totals();

        println!("\n🍽️  {}", details.food_name.bold());
        if let Some(uri) = &details.image_uri {
            println!("{}", uri.dimmed());
        }
        println!("Servings: {}", details.quantity());
        println!("🔥 Calories: {}", format!("{:.0}", totals.calories).yellow());
        println!("🌾 Carbs:    {}", format!("{:.1} g", totals.carbs).yellow());
        println!("🥩 Protein:  {}", format!("{:.1} g", totals.protein).red());
        println!("💧 Fats:     {}", format!("{:.1} g", totals.fat).blue());
    }

    fn back(&self) {
        info!("Returning to previous screen");
    }

    fn alert(&self, title: &str, message: &str) {
        eprintln!("{} {}", format!("❌ {}:", title).red().bold(), message);
    }
}
