use std::fmt::Write as _;

use crate::stage::ClassifyRequest;

pub(crate) const WEIGHTED_SYSTEM: &str = "You are a game analyst. Decide whether a title is a \
competitive multiplayer shooter playable on PC (Windows, Mac or Linux). Shooting must be the main \
way of fighting, in first or third person. Console exclusives, mobile games, single-player \
shooters and games where shooting is incidental do not qualify. Answer with one JSON object.";

pub(crate) const HEURISTIC_SYSTEM: &str =
    "You are a game classification expert. Answer with one JSON object.";

fn describe(request: &ClassifyRequest) -> String {
    let mut out = format!("Title: \"{}\"", request.name);
    if let Some(description) = &request.description {
        let _ = write!(out, "\nDescription: {description}");
    }
    if !request.tags.is_empty() {
        let _ = write!(out, "\nTags: {}", request.tags.join(", "));
    }
    if request.viewer_count > 0 {
        let _ = write!(out, "\nTwitch viewers: {}", request.viewer_count);
    }
    if let Some(genre) = &request.declared_genre {
        let _ = write!(out, "\nKnown genre: {genre}");
    }
    if !request.platform_hints.is_empty() {
        let hints: Vec<String> = request
            .platform_hints
            .iter()
            .map(|(p, id)| format!("{p}={id}"))
            .collect();
        let _ = write!(out, "\nPlatform hints: {}", hints.join(", "));
    }
    out
}

pub(crate) fn weighted_prompt(request: &ClassifyRequest) -> String {
    format!(
        "{}\n\nScore the title 0-100 on each of these dimensions and say whether each one looks \
like a PC competitive shooter:\n\
shooting (is shooting the primary combat interaction), combat (real-time combat at the core), \
multiplayer (online player-versus-player competition), objectives (eliminations, capture points, \
survival), weapons (weapon and ammo systems as a core mechanic), competition (ranked play, esports, \
skill ceiling), platforms (available on PC rather than console- or mobile-only), community \
(esports and streaming culture).\n\n\
Respond with JSON shaped like:\n\
{{\"dimensions\": {{\"shooting\": {{\"score\": 0, \"reason\": \"...\", \"isShooterLike\": true}}, \
... one entry for each of the 8 dimensions ...}}, \
\"overallAnalysis\": {{\"primaryReason\": \"...\", \"subGenre\": \"... or null\", \
\"perspective\": \"first-person|third-person|mixed|unknown\", \
\"pcAvailability\": \"available|exclusive|unavailable\"}}}}",
        describe(request)
    )
}

pub(crate) fn heuristic_prompt(request: &ClassifyRequest) -> String {
    format!(
        "{}\n\nIs this a competitive multiplayer shooter? Give a confidence from 0 to 100, a \
sub-genre if it is one (tactical FPS, battle royale, hero shooter, military FPS, sci-fi FPS...), \
and a short reason.\n\nRespond with JSON: \
{{\"isQualifying\": true, \"confidence\": 0, \"subGenre\": \"...\", \"reason\": \"...\"}}",
        describe(request)
    )
}
