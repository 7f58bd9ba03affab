//! Match simulator - fixed-timestep Pong physics between two AI paddles

use crate::chromosome::{Chromosome, Traits};
use crate::config::SimConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Court side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Horizontal direction pointing toward this side
    pub fn direction(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Ball state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    /// Launch speed magnitude used by every serve
    pub speed: f64,
}

impl Ball {
    /// Centered ball heading right at launch speed
    pub fn new(config: &SimConfig) -> Self {
        Self {
            x: config.center_x(),
            y: config.center_y(),
            vx: config.ball_speed,
            vy: 0.0,
            radius: config.ball_radius,
            speed: config.ball_speed,
        }
    }

    /// Re-center and launch toward `direction` (+1 right, -1 left) at a
    /// random angle within the configured launch cone.
    pub fn reset<R: Rng>(&mut self, direction: f64, config: &SimConfig, rng: &mut R) {
        self.x = config.center_x();
        self.y = config.center_y();

        let angle = rng.gen_range(-config.max_launch_angle..=config.max_launch_angle);
        self.vx = self.speed * angle.cos() * direction;
        self.vy = self.speed * angle.sin();
    }

    /// Current velocity magnitude
    pub fn velocity_magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// A paddle and the traits of the chromosome driving it
#[derive(Clone, Debug)]
pub struct Paddle {
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub traits: Traits,
    /// Display name of the owning chromosome
    pub owner: Option<String>,
}

impl Paddle {
    pub fn new(side: Side, traits: Traits, config: &SimConfig) -> Self {
        let x = match side {
            Side::Left => config.paddle_offset,
            Side::Right => config.width - config.paddle_offset,
        };
        Self {
            side,
            x,
            y: config.center_y(),
            width: config.paddle_width,
            height: config.paddle_height,
            speed: config.paddle_speed,
            traits,
            owner: None,
        }
    }

    /// Move by `speed * amount` (signed, +down) without leaving the court
    pub fn move_by(&mut self, amount: f64, court_height: f64) {
        let half = self.height / 2.0;
        self.y = (self.y + self.speed * amount).clamp(half, court_height - half);
    }

    pub fn left_edge(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right_edge(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    fn snapshot(&self) -> PaddleSnapshot {
        PaddleSnapshot {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            name: self.owner.clone().unwrap_or_else(|| "Unknown".to_string()),
            side: self.side,
        }
    }
}

/// Terminal result of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Side,
    pub left_score: u32,
    pub right_score: u32,
    /// Ticks simulated
    pub ticks: u64,
    /// True when the tick cap decided the match
    pub timed_out: bool,
}

impl MatchOutcome {
    pub fn score_for(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_score,
            Side::Right => self.right_score,
        }
    }
}

// ============================================================================
// GAME
// ============================================================================

/// Game state (one match)
#[derive(Clone, Debug)]
pub struct PongGame {
    pub ball: Ball,
    pub left: Paddle,
    pub right: Paddle,
    pub left_score: u32,
    pub right_score: u32,
    pub game_over: bool,
    pub winner: Option<Side>,
    pub timed_out: bool,
    pub ticks: u64,
    config: SimConfig,
}

impl PongGame {
    /// New match between two chromosomes; the first serve goes to a random side
    pub fn new<R: Rng>(
        left: &Chromosome,
        right: &Chromosome,
        config: SimConfig,
        rng: &mut R,
    ) -> Self {
        let mut game = Self::from_traits(left.traits(), right.traits(), config, rng);
        game.left.owner = Some(left.name().to_string());
        game.right.owner = Some(right.name().to_string());
        game
    }

    /// New match between two anonymous trait sets
    pub fn from_traits<R: Rng>(left: Traits, right: Traits, config: SimConfig, rng: &mut R) -> Self {
        let mut ball = Ball::new(&config);
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        ball.reset(direction, &config, rng);

        Self {
            ball,
            left: Paddle::new(Side::Left, left, &config),
            right: Paddle::new(Side::Right, right, &config),
            left_score: 0,
            right_score: 0,
            game_over: false,
            winner: None,
            timed_out: false,
            ticks: 0,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_score,
            Side::Right => self.right_score,
        }
    }

    /// Advance one frame. No effect once the game is over.
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        if self.game_over {
            return;
        }
        self.ticks += 1;

        // AI paddle movement (both decide from the same pre-move ball)
        let left_move = self.left.ai_move(&self.ball, &self.config, rng);
        let right_move = self.right.ai_move(&self.ball, &self.config, rng);
        self.left.move_by(left_move, self.config.height);
        self.right.move_by(right_move, self.config.height);

        self.ball.x += self.ball.vx;
        self.ball.y += self.ball.vy;

        bounce_off_walls(&mut self.ball, self.config.height);

        deflect_off_paddle(&mut self.ball, &self.left, &self.config);
        deflect_off_paddle(&mut self.ball, &self.right, &self.config);

        if self.ball.x < 0.0 {
            self.award_point(Side::Right, rng);
        } else if self.ball.x > self.config.width {
            self.award_point(Side::Left, rng);
        }
    }

    /// Tick until someone wins or `max_ticks` frames have run.
    ///
    /// Hitting the cap force-finishes the game: higher score wins, ties go
    /// to the left side.
    pub fn run_to_completion<R: Rng>(&mut self, max_ticks: u64, rng: &mut R) -> MatchOutcome {
        let mut frame = 0;
        while !self.game_over && frame < max_ticks {
            self.update(rng);
            frame += 1;
        }

        let winner = match self.winner {
            Some(winner) => winner,
            None => self.force_finish(),
        };

        MatchOutcome {
            winner,
            left_score: self.left_score,
            right_score: self.right_score,
            ticks: self.ticks,
            timed_out: self.timed_out,
        }
    }

    /// Outcome once the game is over
    pub fn outcome(&self) -> Option<MatchOutcome> {
        let winner = self.winner?;
        Some(MatchOutcome {
            winner,
            left_score: self.left_score,
            right_score: self.right_score,
            ticks: self.ticks,
            timed_out: self.timed_out,
        })
    }

    /// End an unresolved game on the current score and return the winner.
    /// A finished game keeps its winner.
    pub fn force_finish(&mut self) -> Side {
        if let Some(winner) = self.winner {
            return winner;
        }
        let winner = if self.right_score > self.left_score {
            Side::Right
        } else {
            Side::Left
        };
        self.declare_winner(winner);
        self.timed_out = true;
        winner
    }

    fn declare_winner(&mut self, winner: Side) {
        self.game_over = true;
        self.winner = Some(winner);
    }

    fn award_point<R: Rng>(&mut self, scorer: Side, rng: &mut R) {
        match scorer {
            Side::Left => self.left_score += 1,
            Side::Right => self.right_score += 1,
        }
        // Serve toward the side that conceded
        self.ball.reset(scorer.opponent().direction(), &self.config, rng);

        if self.left_score >= self.config.winning_score {
            self.declare_winner(Side::Left);
        } else if self.right_score >= self.config.winning_score {
            self.declare_winner(Side::Right);
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            ball: self.ball.clone(),
            left_paddle: self.left.snapshot(),
            right_paddle: self.right.snapshot(),
            left_score: self.left_score,
            right_score: self.right_score,
            width: self.config.width,
            height: self.config.height,
            game_over: self.game_over,
            winner: self.winner,
            ticks: self.ticks,
        }
    }
}

// ============================================================================
// PHYSICS STEPS
// ============================================================================

/// Reflect off the top/bottom walls, keeping the ball in bounds
fn bounce_off_walls(ball: &mut Ball, height: f64) {
    if ball.y - ball.radius <= 0.0 {
        ball.y = ball.radius;
        ball.vy = ball.vy.abs();
    } else if ball.y + ball.radius >= height {
        ball.y = height - ball.radius;
        ball.vy = -ball.vy.abs();
    }
}

/// Reflect off a paddle if the ball center is inside its rectangle.
///
/// The reflection angle depends on where the ball hit relative to the
/// paddle center; speed grows by `speedup` up to `max_ball_speed`.
fn deflect_off_paddle(ball: &mut Ball, paddle: &Paddle, config: &SimConfig) -> bool {
    let inside_x = paddle.left_edge() <= ball.x && ball.x <= paddle.right_edge();
    let inside_y = paddle.top() <= ball.y && ball.y <= paddle.bottom();
    if !(inside_x && inside_y) {
        return false;
    }

    let relative_hit = ((ball.y - paddle.y) / (paddle.height / 2.0)).clamp(-1.0, 1.0);
    let angle = relative_hit * config.max_bounce_angle;

    let speed = (ball.velocity_magnitude() * config.speedup).min(config.max_ball_speed);

    // Push the ball just outside the paddle face so it cannot sink in
    match paddle.side {
        Side::Left => {
            ball.vx = (speed * angle.cos()).abs();
            ball.x = paddle.right_edge() + ball.radius;
        }
        Side::Right => {
            ball.vx = -(speed * angle.cos()).abs();
            ball.x = paddle.left_edge() - ball.radius;
        }
    }
    ball.vy = speed * angle.sin();

    true
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Transferable form of a paddle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaddleSnapshot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub name: String,
    pub side: Side,
}

/// Transferable form of one frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub ball: Ball,
    pub left_paddle: PaddleSnapshot,
    pub right_paddle: PaddleSnapshot,
    pub left_score: u32,
    pub right_score: u32,
    pub width: f64,
    pub height: f64,
    pub game_over: bool,
    pub winner: Option<Side>,
    pub ticks: u64,
}
