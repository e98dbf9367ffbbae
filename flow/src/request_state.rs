//! Extraction of per-side request snapshots from raw engine output
//!
//! The engine interleaves side-scoped update chunks with the shared battle
//! log; this module attributes embedded `|request|` payloads to a side and
//! derives the session's turn-flow flags from them.

use ringside_protocol::{BattleRequest, SideAxis};
use tracing::{debug, warn};

/// The side driven by the caller. The other axis is engine-controlled;
/// its force-switch flag records the same signal without asserting who
/// supplies the next command.
const PLAYER_SIDE: SideAxis = SideAxis::P1;

/// Latest known per-side request snapshot and the flags derived from it.
#[derive(Debug, Default)]
pub struct RequestState {
    pub player_request: Option<BattleRequest>,
    pub cpu_request: Option<BattleRequest>,
    pub player_force_switch: bool,
    pub cpu_force_switch: bool,
    pub team_preview_pending: bool,
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one raw output chunk for side-scoped request payloads and
    /// completion markers. Returns true when a win or tie marker was seen.
    ///
    /// Only the first valid payload per side per chunk is used. Malformed
    /// payloads are logged and skipped; scanning always continues.
    pub fn scan_chunk(&mut self, chunk: &str) -> bool {
        let mut completed = false;
        let mut current_side: Option<SideAxis> = None;
        let mut applied_p1 = false;
        let mut applied_p2 = false;
        let mut expect_side = false;

        for line in chunk.lines() {
            let line = line.trim_end();

            if line == "sideupdate" {
                expect_side = true;
                continue;
            }
            if expect_side {
                expect_side = false;
                match line {
                    "p1" => {
                        current_side = Some(SideAxis::P1);
                        continue;
                    }
                    "p2" => {
                        current_side = Some(SideAxis::P2);
                        continue;
                    }
                    _ => {}
                }
            }

            if line.starts_with("|win|") || line == "|tie" || line.starts_with("|tie|") {
                completed = true;
                continue;
            }

            let Some(json) = line.strip_prefix("|request|") else {
                continue;
            };
            if json.is_empty() {
                continue;
            }
            let Some(axis) = current_side else {
                debug!("request payload outside a side-scoped update, skipping");
                continue;
            };
            let applied = match axis {
                SideAxis::P1 => &mut applied_p1,
                SideAxis::P2 => &mut applied_p2,
            };
            if *applied {
                continue;
            }
            match BattleRequest::from_json(json) {
                Ok(request) => {
                    self.apply(axis, request);
                    *applied = true;
                }
                Err(e) => {
                    warn!(side = %axis, error = %e, "skipping malformed request payload");
                }
            }
        }

        completed
    }

    /// Fold one side's request into the derived flags. The two force-switch
    /// flags are independent; both can be true after a double faint.
    fn apply(&mut self, axis: SideAxis, request: BattleRequest) {
        let force = request.is_force_switch();
        if axis == PLAYER_SIDE {
            self.player_force_switch = force;
            self.team_preview_pending = request.team_preview;
            self.player_request = Some(request);
        } else {
            self.cpu_force_switch = force;
            self.cpu_request = Some(request);
        }
    }
}
