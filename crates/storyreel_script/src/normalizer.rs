//! Turning loosely typed model output into canonical scenes.
//!
//! Model output is read into a [`RawScene`] first. Every field is optional
//! and the usual key spellings and shapes are accepted, so a sloppy response
//! degrades into empty fields instead of a parse failure. [`normalize`] then
//! produces the human description, the one-line JSON prompt and the plain
//! generation prompt from the same cleaned values.

use derive_getters::Getters;
use serde::Serialize;
use serde_json::{Map, Value};
use storyreel_core::{DialogueLanguage, Scene};

/// Words models use for "nothing here", in the supported dialogue languages.
const NONE_SENTINELS: &[&str] = &[
    "none",
    "n/a",
    "na",
    "nil",
    "null",
    "empty",
    "unknown",
    "not specified",
    "no dialogue",
    "không",
    "không có",
    "không rõ",
    "chưa rõ",
    "trống",
    "không xác định",
    "ninguno",
    "aucun",
    "keine",
    "なし",
    "없음",
    "无",
];

const EDGE_PUNCTUATION: &[char] = &[',', '.', ';', ':', '|', '-', '–', '—', '•', '*', '_', '~'];

const DEFAULT_TIME_WINDOW: (f64, f64) = (0.0, 5.0);

/// Clean one attribute value for human-readable text.
///
/// Trims, folds line breaks into spaces, strips leading and trailing
/// punctuation, and maps "none"-style filler to the empty string.
///
/// # Examples
///
/// ```
/// use storyreel_script::clean_attribute;
///
/// assert_eq!(clean_attribute("  - misty harbor,\n at dawn. "), "misty harbor,  at dawn");
/// assert_eq!(clean_attribute("N/A"), "");
/// assert_eq!(clean_attribute("Không"), "");
/// ```
pub fn clean_attribute(text: &str) -> String {
    let unbroken = text.trim().replace("\r\n", " ").replace(['\n', '\r'], " ");
    let stripped =
        unbroken.trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c));

    let lowered = stripped.to_lowercase();
    if NONE_SENTINELS.contains(&lowered.as_str()) {
        return String::new();
    }
    stripped.to_string()
}

/// Collapse every whitespace run to one space and trim.
///
/// Output never contains line breaks or two consecutive spaces.
///
/// # Examples
///
/// ```
/// use storyreel_script::clean_for_json;
///
/// assert_eq!(clean_for_json(" a\n\n b \t c "), "a b c");
/// ```
pub fn clean_for_json(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_json_attribute(text: &str) -> String {
    clean_for_json(&clean_attribute(text))
}

/// Setting of a scene.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct RawEnvironment {
    location: String,
    time_of_day: String,
    weather: String,
    lighting: String,
    details: String,
}

/// One on-screen character.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct RawCharacter {
    name: String,
    appearance: String,
    outfit: String,
    body_movement: String,
    expression: String,
}

/// Camera work for a scene.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct RawCamera {
    shot: String,
    angle: String,
    movement: String,
}

/// One spoken line.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct RawDialogue {
    speaker: String,
    line: String,
}

/// Tolerant record for one scene object in a model response.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct RawScene {
    index: u32,
    time_window: (f64, f64),
    continuity_note: String,
    environment: RawEnvironment,
    characters: Vec<RawCharacter>,
    camera: RawCamera,
    style: String,
    dialogue: Vec<RawDialogue>,
}

impl RawScene {
    /// Read a scene object.
    ///
    /// `position` is the 1-based place of the object in its batch and
    /// becomes the index when the object carries none.
    pub fn from_value(value: &Value, position: u32) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);

        let index = field(object, &["scene_number", "sceneNumber", "scene", "index", "number"])
            .and_then(as_index)
            .unwrap_or(position);

        let time_window = field(
            object,
            &["time_window", "timeWindow", "time", "timestamp", "duration"],
        )
        .and_then(parse_time_window)
        .unwrap_or(DEFAULT_TIME_WINDOW);

        Self {
            index,
            time_window,
            continuity_note: text_field(
                object,
                &["continuity_note", "continuityNote", "continuity", "transition"],
            ),
            environment: field(object, &["environment", "setting", "location"])
                .map(parse_environment)
                .unwrap_or_default(),
            characters: field(object, &["characters", "character", "cast"])
                .map(|v| as_list(v).iter().map(parse_character).collect())
                .unwrap_or_default(),
            camera: field(object, &["camera", "camera_work", "cameraWork", "shot"])
                .map(parse_camera)
                .unwrap_or_default(),
            style: text_field(object, &["style", "visual_style", "visualStyle"]),
            dialogue: field(object, &["dialogue", "dialogues", "lines", "speech"])
                .map(|v| as_list(v).iter().filter_map(parse_dialogue).collect())
                .unwrap_or_default(),
        }
    }

    /// Replace the scene index.
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// One-sentence end state used to keep the next batch continuous.
    ///
    /// Built from the location and the first character's body movement.
    /// Empty when the scene has neither.
    pub fn continuity_summary(&self) -> String {
        let location = clean_attribute(&self.environment.location);
        let mover = self.characters.first().map(|c| {
            (
                clean_attribute(&c.name),
                clean_attribute(&c.body_movement),
            )
        });

        let action = match mover {
            Some((name, movement)) if !movement.is_empty() => {
                let who = if name.is_empty() { "the main character".to_string() } else { name };
                format!("{} was {}", who, movement)
            }
            _ => String::new(),
        };

        clean_for_json(&match (location.is_empty(), action.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("The previous scene ended at {}.", location),
            (true, false) => format!("At the end of the previous scene, {}.", action),
            (false, false) => format!(
                "The previous scene ended at {}, where {}.",
                location, action
            ),
        })
    }
}

#[derive(Debug, Serialize)]
struct CanonicalScene {
    scene: u32,
    time_window: [Value; 2],
    #[serde(skip_serializing_if = "String::is_empty")]
    continuity: String,
    environment: CanonicalEnvironment,
    characters: Vec<CanonicalCharacter>,
    camera: CanonicalCamera,
    style: String,
    dialogue_language: String,
    dialogue: Vec<CanonicalDialogue>,
}

#[derive(Debug, Serialize)]
struct CanonicalEnvironment {
    location: String,
    time_of_day: String,
    weather: String,
    lighting: String,
    details: String,
}

#[derive(Debug, Serialize)]
struct CanonicalCharacter {
    name: String,
    appearance: String,
    outfit: String,
    body_movement: String,
    expression: String,
}

#[derive(Debug, Serialize)]
struct CanonicalCamera {
    shot: String,
    angle: String,
    movement: String,
}

#[derive(Debug, Serialize)]
struct CanonicalDialogue {
    speaker: String,
    line: String,
}

/// Build the canonical scene from a raw record.
///
/// `style` is the requested visual style; it wins over any style the model
/// wrote into the scene, which is only used when `style` is blank.
pub fn normalize(raw: &RawScene, style: &str, language: DialogueLanguage) -> Scene {
    let style = if style.trim().is_empty() { raw.style.as_str() } else { style };
    let (start, end) = raw.time_window;

    let environment = CanonicalEnvironment {
        location: clean_json_attribute(&raw.environment.location),
        time_of_day: clean_json_attribute(&raw.environment.time_of_day),
        weather: clean_json_attribute(&raw.environment.weather),
        lighting: clean_json_attribute(&raw.environment.lighting),
        details: clean_json_attribute(&raw.environment.details),
    };
    let characters: Vec<CanonicalCharacter> = raw
        .characters
        .iter()
        .map(|c| CanonicalCharacter {
            name: clean_json_attribute(&c.name),
            appearance: clean_json_attribute(&c.appearance),
            outfit: clean_json_attribute(&c.outfit),
            body_movement: clean_json_attribute(&c.body_movement),
            expression: clean_json_attribute(&c.expression),
        })
        .filter(|c| {
            !(c.name.is_empty()
                && c.appearance.is_empty()
                && c.outfit.is_empty()
                && c.body_movement.is_empty()
                && c.expression.is_empty())
        })
        .collect();
    let camera = CanonicalCamera {
        shot: clean_json_attribute(&raw.camera.shot),
        angle: clean_json_attribute(&raw.camera.angle),
        movement: clean_json_attribute(&raw.camera.movement),
    };
    let dialogue: Vec<CanonicalDialogue> = if language.has_dialogue() {
        raw.dialogue
            .iter()
            .map(|d| CanonicalDialogue {
                speaker: clean_json_attribute(&d.speaker),
                line: clean_for_json(d.line.trim()),
            })
            .filter(|d| !clean_attribute(&d.line).is_empty())
            .collect()
    } else {
        Vec::new()
    };

    let canonical = CanonicalScene {
        scene: raw.index,
        time_window: [seconds_value(start), seconds_value(end)],
        continuity: clean_json_attribute(&raw.continuity_note),
        environment,
        characters,
        camera,
        style: clean_json_attribute(style),
        dialogue_language: language.prompt_name().to_string(),
        dialogue,
    };

    let description = describe(&canonical, start, end);
    let generation_prompt = generation_prompt(&canonical);
    // Plain strings and numbers only, serialization cannot fail
    let json_prompt = serde_json::to_string(&canonical).unwrap_or_default();

    Scene::new(raw.index, description, json_prompt, generation_prompt)
}

fn describe(scene: &CanonicalScene, start: f64, end: f64) -> String {
    let mut segments = vec![format!(
        "Scene {} ({}s-{}s)",
        scene.scene,
        format_seconds(start),
        format_seconds(end)
    )];

    if !scene.continuity.is_empty() {
        segments.push(format!("Continuity: {}", scene.continuity));
    }

    let env = &scene.environment;
    let setting = join_non_empty(
        &[&env.location, &env.time_of_day, &env.weather, &env.lighting, &env.details],
        ", ",
    );
    if !setting.is_empty() {
        segments.push(format!("Setting: {}", setting));
    }

    let characters: Vec<String> = scene.characters.iter().map(describe_character).collect();
    if !characters.is_empty() {
        segments.push(format!("Characters: {}", characters.join("; ")));
    }

    let camera = join_non_empty(
        &[&scene.camera.shot, &scene.camera.angle, &scene.camera.movement],
        ", ",
    );
    let camera_style = match (camera.is_empty(), scene.style.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("Camera: {}", camera),
        (true, false) => format!("Style: {}", scene.style),
        (false, false) => format!("Camera: {}, style: {}", camera, scene.style),
    };
    if !camera_style.is_empty() {
        segments.push(camera_style);
    }

    let lines: Vec<String> = scene.dialogue.iter().map(describe_line).collect();
    if !lines.is_empty() {
        segments.push(format!("Dialogue ({}): {}", scene.dialogue_language, lines.join(" ")));
    }

    segments.join(" | ")
}

fn describe_character(c: &CanonicalCharacter) -> String {
    let looks = join_non_empty(&[&c.appearance, &c.outfit], ", ");
    let doing = join_non_empty(&[&c.body_movement, &c.expression], ", ");
    let mut text = if c.name.is_empty() { "Unnamed".to_string() } else { c.name.clone() };
    if !looks.is_empty() {
        text.push_str(&format!(" ({})", looks));
    }
    if !doing.is_empty() {
        text.push_str(&format!(" {}", doing));
    }
    text
}

fn describe_line(d: &CanonicalDialogue) -> String {
    if d.speaker.is_empty() {
        format!("\"{}\"", d.line)
    } else {
        format!("{}: \"{}\"", d.speaker, d.line)
    }
}

fn generation_prompt(scene: &CanonicalScene) -> String {
    let env = &scene.environment;
    let mut sentences = Vec::new();

    if !scene.style.is_empty() {
        sentences.push(format!("{} style", scene.style));
    }
    let setting = join_non_empty(
        &[&env.location, &env.time_of_day, &env.weather, &env.lighting, &env.details],
        ", ",
    );
    if !setting.is_empty() {
        sentences.push(setting);
    }
    sentences.extend(scene.characters.iter().map(describe_character));
    let camera = join_non_empty(
        &[&scene.camera.shot, &scene.camera.angle, &scene.camera.movement],
        ", ",
    );
    if !camera.is_empty() {
        sentences.push(format!("Camera: {}", camera));
    }
    if !scene.dialogue.is_empty() {
        let lines: Vec<String> = scene.dialogue.iter().map(describe_line).collect();
        sentences.push(format!(
            "Spoken in {}: {}",
            scene.dialogue_language,
            lines.join(" ")
        ));
    }

    clean_for_json(&sentences.join(". "))
}

fn join_non_empty(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as i64)
    } else {
        format!("{}", seconds)
    }
}

fn seconds_value(seconds: f64) -> Value {
    if seconds.fract() == 0.0 {
        Value::from(seconds as i64)
    } else {
        Value::from(seconds)
    }
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .filter(|v| !v.is_null())
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    field(object, keys).map(as_text).unwrap_or_default()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(as_text)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) | Value::Null => String::new(),
    }
}

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn as_index(value: &Value) -> Option<u32> {
    let index = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .ok(),
        _ => None,
    };
    index.filter(|n| *n > 0)
}

fn as_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches(['s', 'S']).trim().parse().ok(),
        _ => None,
    };
    seconds.filter(|s| s.is_finite() && *s >= 0.0)
}

fn parse_time_window(value: &Value) -> Option<(f64, f64)> {
    let (start, end) = match value {
        Value::Array(items) if items.len() == 2 => (as_seconds(&items[0])?, as_seconds(&items[1])?),
        Value::Object(object) => (
            as_seconds(field(object, &["start", "from", "begin"])?)?,
            as_seconds(field(object, &["end", "to", "finish"])?)?,
        ),
        Value::String(s) => {
            let (a, b) = s.split_once('-')?;
            (
                as_seconds(&Value::from(a.trim()))?,
                as_seconds(&Value::from(b.trim()))?,
            )
        }
        _ => return None,
    };
    (end > start).then_some((start, end))
}

fn parse_environment(value: &Value) -> RawEnvironment {
    match value {
        Value::Object(object) => RawEnvironment {
            location: text_field(object, &["location", "place", "setting"]),
            time_of_day: text_field(object, &["time_of_day", "timeOfDay", "time"]),
            weather: text_field(object, &["weather"]),
            lighting: text_field(object, &["lighting", "light"]),
            details: text_field(object, &["details", "description", "props"]),
        },
        other => RawEnvironment {
            location: as_text(other),
            ..RawEnvironment::default()
        },
    }
}

fn parse_character(value: &Value) -> RawCharacter {
    match value {
        Value::Object(object) => RawCharacter {
            name: text_field(object, &["name", "character"]),
            appearance: text_field(object, &["appearance", "description", "looks"]),
            outfit: text_field(object, &["outfit", "clothing", "costume"]),
            body_movement: text_field(
                object,
                &["body_movement", "bodyMovement", "action", "movement", "actions"],
            ),
            expression: text_field(
                object,
                &["expression", "facial_expression", "facialExpression", "emotion"],
            ),
        },
        other => RawCharacter {
            name: as_text(other),
            ..RawCharacter::default()
        },
    }
}

fn parse_camera(value: &Value) -> RawCamera {
    match value {
        Value::Object(object) => RawCamera {
            shot: text_field(object, &["shot", "shot_type", "shotType", "framing"]),
            angle: text_field(object, &["angle", "camera_angle", "cameraAngle"]),
            movement: text_field(object, &["movement", "camera_movement", "cameraMovement", "motion"]),
        },
        other => RawCamera {
            shot: as_text(other),
            ..RawCamera::default()
        },
    }
}

fn parse_dialogue(value: &Value) -> Option<RawDialogue> {
    let dialogue = match value {
        Value::Object(object) => RawDialogue {
            speaker: text_field(object, &["speaker", "character", "name"]),
            line: text_field(object, &["line", "text", "content", "say"]),
        },
        Value::String(s) => RawDialogue {
            speaker: String::new(),
            line: s.clone(),
        },
        _ => return None,
    };
    (!dialogue.line.trim().is_empty()).then_some(dialogue)
}
