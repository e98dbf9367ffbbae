//! Translation of tokenized protocol lines into human-readable events
//!
//! One handler per known protocol command; unknown commands produce no
//! event so newer engine versions degrade gracefully.

use ringside_protocol::{HpStatus, Position, ProtocolLine, SideAxis};

use crate::context::ParserContext;

/// Classification used by the aggregation layer's dedup rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Turn,
    Win,
    Tie,
    Other,
}

/// One human-readable battle event.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleEvent {
    pub text: String,
    pub kind: EventKind,
}

impl BattleEvent {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: EventKind::Other,
        }
    }

    fn with_kind(text: impl Into<String>, kind: EventKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Whether aggregation keeps this event even when textually identical
    /// to its predecessor.
    pub fn always_kept(&self) -> bool {
        !matches!(self.kind, EventKind::Other)
    }
}

/// Translate one tokenized line against the session's parser context.
///
/// Returns zero, one, or many events and mutates the context as a side
/// effect.
pub fn translate(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    match line.command.as_str() {
        // === Initialization ===
        // Informational setup lines carry no narration.
        "player" | "teamsize" | "gametype" | "gen" | "tier" | "rule" | "rated" | "poke" => {
            Vec::new()
        }
        "clearpoke" => {
            ctx.team_preview_active = true;
            Vec::new()
        }
        "teampreview" => one("Team preview: choose your lead order."),
        "start" => {
            ctx.team_preview_active = false;
            one("The battle began!")
        }

        // === Turn flow ===
        "turn" => turn(line, ctx),
        "upkeep" => {
            ctx.turn_boundary();
            Vec::new()
        }
        "win" => {
            let user = arg(line, 0);
            vec![BattleEvent::with_kind(
                format!("{user} won the battle!"),
                EventKind::Win,
            )]
        }
        "tie" => vec![BattleEvent::with_kind(
            "The battle ended in a tie!",
            EventKind::Tie,
        )],

        // === Major actions ===
        "move" => move_used(line, ctx),
        "switch" => switch(line, ctx, "switched in"),
        "drag" => switch(line, ctx, "was dragged out"),
        "replace" => switch(line, ctx, "appeared"),
        "faint" => {
            ctx.move_ended();
            one(format!("{} fainted!", subject_name(line)))
        }
        "cant" => cant(line),

        // === HP changes ===
        "split" => {
            ctx.suppress_next_damage = true;
            Vec::new()
        }
        "-damage" => damage(line, ctx),
        "-heal" => heal(line),
        "-sethp" => sethp(line),

        // === Status ===
        "-status" => status(line),
        "-curestatus" => curestatus(line),

        // === Boosts ===
        "-boost" => boost(line, true),
        "-unboost" => boost(line, false),

        // === Weather, field, side ===
        "-weather" => weather(line, ctx),
        "-fieldstart" => field_start(line, ctx),
        "-fieldend" => field_end(line, ctx),
        "-sidestart" => side_start(line, ctx),
        "-sideend" => side_end(line, ctx),

        // === Reveals ===
        "-ability" => one(format!(
            "{}'s {} activated!",
            subject_name(line),
            arg(line, 1)
        )),
        "-item" => item(line),
        "-enditem" => one(format!(
            "{} lost its {}!",
            subject_name(line),
            arg(line, 1)
        )),

        // === Effectiveness (buffered until the damage line) ===
        "-crit" => buffer_effectiveness(line, ctx, "A critical hit!"),
        "-supereffective" => buffer_effectiveness(line, ctx, "It's super effective!"),
        "-resisted" => buffer_effectiveness(line, ctx, "It's not very effective..."),
        "-immune" => one(format!("It doesn't affect {}...", subject_name(line))),

        // === Misses and failures ===
        "-miss" => one(format!("{}'s attack missed!", subject_name(line))),
        "-fail" => one("But it failed!"),

        // === Volatile effects ===
        "-start" => volatile_start(line),
        "-end" => one(format!(
            "{}'s {} ended.",
            subject_name(line),
            effect_label(arg(line, 1))
        )),

        // === Form changes ===
        "-formechange" | "detailschange" => one(format!(
            "{} changed form to {}!",
            subject_name(line),
            species_of(arg(line, 1))
        )),
        "-transform" => transform(line),
        "-mega" => one(format!("{} Mega Evolved!", subject_name(line))),

        // The request extractor owns |request| payloads; no event here.
        "request" => Vec::new(),

        // Forward-compatible: unknown commands are never an error.
        _ => Vec::new(),
    }
}

fn one(text: impl Into<String>) -> Vec<BattleEvent> {
    vec![BattleEvent::new(text)]
}

fn arg<'a>(line: &'a ProtocolLine, index: usize) -> &'a str {
    line.args.get(index).map(String::as_str).unwrap_or("")
}

/// Display name for the combatant token in the first argument slot.
fn subject_name(line: &ProtocolLine) -> String {
    display_name(arg(line, 0))
}

fn display_name(token: &str) -> String {
    Position::parse(token)
        .map(|p| p.name)
        .unwrap_or_else(|| token.to_string())
}

/// Species name from a details string like "Pikachu, L50, M".
fn species_of(details: &str) -> &str {
    details.split(',').next().unwrap_or(details).trim()
}

/// Strip the effect-class prefix from a label like "move: Stealth Rock".
fn effect_label(raw: &str) -> &str {
    for prefix in ["move:", "ability:", "item:"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            return rest.trim_start();
        }
    }
    raw
}

/// Resolve a `[from]` cause: volatile status labels first, then a generic
/// effect label.
fn cause_label(raw: &str) -> String {
    match raw {
        "brn" => "its burn".to_string(),
        "psn" | "tox" => "poison".to_string(),
        "confusion" => "its confusion".to_string(),
        "recoil" => "recoil".to_string(),
        "curse" => "the curse".to_string(),
        "sandstorm" => "the sandstorm".to_string(),
        "hail" => "the hail".to_string(),
        _ => effect_label(raw).to_string(),
    }
}

fn status_phrase(code: &str) -> String {
    match code {
        "brn" => "was burned".to_string(),
        "psn" => "was poisoned".to_string(),
        "tox" => "was badly poisoned".to_string(),
        "par" => "was paralyzed".to_string(),
        "slp" => "fell asleep".to_string(),
        "frz" => "was frozen solid".to_string(),
        other => format!("was afflicted with {other}"),
    }
}

fn status_noun(code: &str) -> &str {
    match code {
        "brn" => "burn",
        "psn" | "tox" => "poison",
        "par" => "paralysis",
        "slp" => "sleep",
        "frz" => "freeze",
        other => other,
    }
}

fn stat_name(code: &str) -> &str {
    match code {
        "atk" => "Attack",
        "def" => "Defense",
        "spa" => "Sp. Atk",
        "spd" => "Sp. Def",
        "spe" => "Speed",
        "accuracy" => "accuracy",
        "evasion" => "evasiveness",
        other => other,
    }
}

fn turn(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    ctx.turn_boundary();
    if let Ok(n) = arg(line, 0).parse() {
        ctx.turn = n;
    }
    vec![BattleEvent::with_kind(
        format!("Turn {}", arg(line, 0)),
        EventKind::Turn,
    )]
}

fn move_used(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let actor = arg(line, 0);
    let move_name = arg(line, 1);
    let target = line.args.get(2);

    // A new move is a boundary for any stale annotations.
    ctx.pending_effectiveness.clear();
    ctx.current_move = target.map(|t| (actor.to_string(), t.clone()));

    one(format!("{} used {}!", display_name(actor), move_name))
}

fn switch(line: &ProtocolLine, ctx: &mut ParserContext, verb: &str) -> Vec<BattleEvent> {
    ctx.move_ended();
    let name = subject_name(line);
    match line.args.get(2).and_then(|s| HpStatus::parse(s)) {
        Some(hp) => one(format!("{name} {verb}! ({hp})")),
        None => one(format!("{name} {verb}!")),
    }
}

fn cant(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let phrase = match arg(line, 1) {
        "slp" => "is fast asleep",
        "par" => "is paralyzed",
        "frz" => "is frozen solid",
        "flinch" => "flinched",
        "recharge" => "must recharge",
        _ => "can't move",
    };
    one(format!("{name} {phrase}!"))
}

fn damage(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    // A split marker means this damage was already reported from the other
    // perspective; drop exactly this one line.
    if ctx.suppress_next_damage {
        ctx.suppress_next_damage = false;
        return Vec::new();
    }

    let Some(target) = line.args.first() else {
        return Vec::new();
    };
    let name = display_name(target);
    let hp = line.args.get(1).and_then(|s| HpStatus::parse(s));

    let mut text = match line.kwargs.from_effect() {
        Some(raw) => {
            let cause = cause_label(raw);
            match line.kwargs.of_subject().filter(|of| *of != target.as_str()) {
                Some(of) => format!("{name} took damage from {}'s {cause}", display_name(of)),
                None => format!("{name} took damage from {cause}"),
            }
        }
        None => format!("{name} took damage"),
    };
    if let Some(hp) = &hp {
        text.push_str(&format!(" ({hp})"));
    }
    text.push('!');

    let mut events = vec![BattleEvent::new(text)];
    if ctx.move_targets(target) {
        for note in ctx.take_effectiveness_for(target) {
            events.push(BattleEvent::new(note));
        }
    }
    events
}

fn heal(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let hp = line.args.get(1).and_then(|s| HpStatus::parse(s));

    let mut text = match line.kwargs.from_effect() {
        Some(raw) => format!("{name} restored health due to {}", cause_label(raw)),
        None => format!("{name} restored health"),
    };
    if let Some(hp) = &hp {
        text.push_str(&format!(" ({hp})"));
    }
    text.push('!');
    one(text)
}

fn sethp(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    match line.args.get(1).and_then(|s| HpStatus::parse(s)) {
        Some(hp) => one(format!("{name}'s HP changed ({hp})!")),
        None => Vec::new(),
    }
}

fn status(line: &ProtocolLine) -> Vec<BattleEvent> {
    one(format!(
        "{} {}!",
        subject_name(line),
        status_phrase(arg(line, 1))
    ))
}

fn curestatus(line: &ProtocolLine) -> Vec<BattleEvent> {
    one(format!(
        "{}'s {} was cured!",
        subject_name(line),
        status_noun(arg(line, 1))
    ))
}

fn boost(line: &ProtocolLine, rose: bool) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let stat = stat_name(arg(line, 1));
    let stages: u32 = arg(line, 2).parse().unwrap_or(0);

    let phrase = match (stages, rose) {
        (0, _) => "changed".to_string(),
        (1, true) => "rose".to_string(),
        (1, false) => "fell".to_string(),
        (2, true) => "rose sharply".to_string(),
        (2, false) => "fell sharply".to_string(),
        (_, true) => "rose drastically".to_string(),
        (_, false) => "fell drastically".to_string(),
    };

    let suffix = match line.kwargs.from_effect() {
        Some(raw) => format!(" due to {}", cause_label(raw)),
        None => String::new(),
    };

    one(format!("{name}'s {stat} {phrase}{suffix}!"))
}

fn weather(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let label = arg(line, 0);

    if label.is_empty() || label == "none" {
        return match ctx.active_weather.take() {
            Some(_) => one("The weather cleared."),
            None => Vec::new(),
        };
    }

    if line.kwargs.get("upkeep").is_some() {
        // Continuation line; the weather was already announced.
        return one(format!("{label} continues."));
    }

    ctx.active_weather = Some(label.to_string());
    one(format!("{label} began!"))
}

fn field_start(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let label = effect_label(arg(line, 0)).to_string();
    let text = format!("{label} took effect across the battlefield!");
    ctx.field_conditions.insert(label);
    one(text)
}

fn field_end(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let label = effect_label(arg(line, 0)).to_string();
    ctx.field_conditions.remove(&label);
    one(format!("{label} faded from the battlefield."))
}

/// Display label for a side token: the embedded name when present,
/// otherwise the axis itself.
fn side_display(token: &str) -> &str {
    token.split_once(": ").map(|(_, name)| name).unwrap_or(token)
}

fn side_start(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let token = arg(line, 0);
    let Some(axis) = SideAxis::parse(token) else {
        return Vec::new();
    };
    let label = effect_label(arg(line, 1)).to_string();
    let text = format!("{label} was set up on {}'s side!", side_display(token));
    ctx.side_conditions_mut(axis).insert(label);
    one(text)
}

fn side_end(line: &ProtocolLine, ctx: &mut ParserContext) -> Vec<BattleEvent> {
    let token = arg(line, 0);
    let Some(axis) = SideAxis::parse(token) else {
        return Vec::new();
    };
    let label = effect_label(arg(line, 1)).to_string();
    ctx.side_conditions_mut(axis).remove(&label);
    one(format!(
        "{label} faded from {}'s side.",
        side_display(token)
    ))
}

fn item(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let item = arg(line, 1);
    match line.kwargs.from_effect() {
        Some(raw) => one(format!(
            "{name} obtained {item} due to {}!",
            cause_label(raw)
        )),
        None => one(format!("{name}'s {item} was revealed!")),
    }
}

fn buffer_effectiveness(
    line: &ProtocolLine,
    ctx: &mut ParserContext,
    note: &str,
) -> Vec<BattleEvent> {
    let Some(subject) = line.args.first() else {
        return Vec::new();
    };
    // Annotations for a target other than the in-flight move's are dropped,
    // never misattached.
    if ctx.move_targets(subject) {
        ctx.pending_effectiveness
            .push((subject.clone(), note.to_string()));
    }
    Vec::new()
}

fn volatile_start(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let effect = effect_label(arg(line, 1));
    if effect == "confusion" {
        one(format!("{name} became confused!"))
    } else {
        one(format!("{name} was afflicted by {effect}!"))
    }
}

fn transform(line: &ProtocolLine) -> Vec<BattleEvent> {
    let name = subject_name(line);
    let into = display_name(arg(line, 1));
    one(format!("{name} transformed into {into}!"))
}
