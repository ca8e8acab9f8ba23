//! Run lifecycle
//!
//! Owns the state, the play field and the input, drives the simulation at a
//! fixed timestep, restarts on confirm after a game over, and hands each
//! finished run to the leaderboard and score sink exactly once.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::input::InputState;
use crate::leaderboard::Leaderboard;
use crate::persistence::KeyValueStore;
use crate::platform;
use crate::scoring::{ScoreSink, ScoreSubmission};
use crate::settings::Settings;
use crate::sim::{GameState, TickInput, World, tick};

pub struct Game {
    pub state: GameState,
    pub world: World,
    pub input: InputState,
    pub settings: Settings,
    pub leaderboard: Leaderboard,
    store: Box<dyn KeyValueStore>,
    sink: Option<Box<dyn ScoreSink>>,
    accumulator: f32,
    /// Finished run already recorded/submitted
    run_recorded: bool,
    /// Runs started this session
    runs: u32,
}

impl Game {
    pub fn new<S>(store: S, seed: u64) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let settings = Settings::load(&store);
        let leaderboard = Leaderboard::load(&store);

        let mut state = GameState::new(store.clone());
        state.initialize(settings.starting_level);
        let world = World::new(seed, state.level());

        let mut input = InputState::default();
        input.idle_mode = settings.autopilot;

        log::info!(
            "Run 1 starting at level {} with seed {} (best {})",
            state.level(),
            seed,
            state.best_score()
        );

        Self {
            state,
            world,
            input,
            settings,
            leaderboard,
            store: Box::new(store),
            sink: None,
            accumulator: 0.0,
            run_recorded: false,
            runs: 1,
        }
    }

    /// Send finished runs to `sink` when score submission is enabled
    pub fn with_sink(mut self, sink: impl ScoreSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Start a fresh run (best score and subscriptions are kept)
    pub fn restart(&mut self, seed: u64) {
        self.state.initialize(self.settings.starting_level);
        self.world.reset(seed, self.state.level());
        self.accumulator = 0.0;
        self.run_recorded = false;
        self.runs += 1;
        log::info!(
            "Run {} starting at level {} with seed {}",
            self.runs,
            self.state.level(),
            seed
        );
    }

    /// Advance by a frame's elapsed time. Returns the substeps run.
    pub fn update(&mut self, dt: f32) -> u32 {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.snapshot();
            self.step(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_one_shots();
        }

        // Over budget: drop the backlog instead of fast-forwarding later
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    fn step(&mut self, input: &TickInput) {
        if self.state.is_ended() {
            if input.confirm {
                self.restart(self.world.seed.wrapping_add(1));
            }
            return;
        }

        tick(&mut self.state, &mut self.world, input, SIM_DT);

        if self.state.is_ended() && !self.run_recorded {
            self.finish_run();
        }
    }

    /// Record the run locally and hand it to the sink
    fn finish_run(&mut self) {
        self.run_recorded = true;
        let score = self.state.score();
        let name = self.settings.player_name.clone();

        if let Some(rank) =
            self.leaderboard
                .record(&name, score, self.state.level(), platform::now_ms())
        {
            log::info!("New local high score #{}: {}", rank, score);
            self.leaderboard.save(self.store.as_ref());
        }

        if !self.settings.submit_scores || score == 0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        match ScoreSubmission::new(&name, score) {
            Ok(submission) => sink.submit(submission),
            Err(e) => log::warn!("Score not submitted: {}", e),
        }
    }

    /// Toggle autopilot and persist the choice
    pub fn toggle_autopilot(&mut self) {
        self.settings.autopilot = !self.settings.autopilot;
        self.input.idle_mode = self.settings.autopilot;
        self.settings.save(self.store.as_ref());
        log::info!("Autopilot: {}", self.settings.autopilot);
    }
}
