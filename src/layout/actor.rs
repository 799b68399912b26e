//! Actor lanes: headers, timelines and activation bars

use tracing::{debug, warn};

use crate::parser::ActorSpec;
use crate::renderer::{DrawSurface, Path, Stroke};
use crate::style::{FontSet, Props, Resolver, TextStyle};

use super::error::LayoutError;
use super::shapes::{draw_rectangle, BoxStyle, TextBox};
use super::types::{Borders, Point, Rect};
use super::working::Working;

const SHADOW_COLOUR: &str = "rgb(210,210,210)";
const SHADOW_OFFSET: f64 = 3.0;
const TIMELINE_COLOUR: &str = "rgb(0,0,0)";

/// Activation interval waiting for the next timeline pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingFlow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// One participant column
#[derive(Debug, Clone, PartialEq)]
pub struct ActorLane {
    pub alias: String,
    pub name: Vec<String>,
    pub style: TextStyle,
    pub gap_to_next: f64,
    pub radius: f64,
    pub flow_width: f64,
    pub timeline_width: f64,
    pub timeline_dash: Vec<f64>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub middle: f64,
    pub pending: PendingFlow,
    /// Bar runs on from the previous timeline segment
    pub continuing: bool,
}

impl ActorLane {
    fn from_spec(
        index: usize,
        spec: &ActorSpec,
        defaults: Props,
        fonts: &FontSet,
    ) -> Result<Self, LayoutError> {
        let name = spec
            .name
            .as_ref()
            .map(|n| n.lines())
            .ok_or(LayoutError::MissingActorName { index })?;
        let alias = spec
            .alias
            .clone()
            .ok_or_else(|| LayoutError::MissingActorAlias {
                index,
                name: name.join(" "),
            })?;

        let local = Props::new(&spec.style);
        let r = Resolver::new(local, defaults);
        Ok(Self {
            alias,
            name,
            style: TextStyle::resolve(fonts, local, defaults, &TextStyle::actor()),
            gap_to_next: r.positive("gapToNext", 200.0),
            radius: r.non_negative("radius", 5.0),
            flow_width: r.positive("flowWidth", 5.0),
            timeline_width: r.positive("timelineWidth", 1.0),
            timeline_dash: r.dash("timelineDash", &[3.0, 3.0]),
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            middle: 0.0,
            pending: PendingFlow::default(),
            continuing: false,
        })
    }

    /// Left edge of the activation bar
    pub fn bar_left(&self) -> f64 {
        self.middle - self.flow_width / 2.0
    }

    pub fn bar_right(&self) -> f64 {
        self.middle + self.flow_width / 2.0
    }
}

/// Lanes in declaration order
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    lanes: Vec<ActorLane>,
}

impl ActorRegistry {
    /// Validate the declared actors and resolve their styles
    pub fn from_specs(
        specs: &[ActorSpec],
        defaults: Props,
        fonts: &FontSet,
    ) -> Result<Self, LayoutError> {
        if specs.is_empty() {
            return Err(LayoutError::NoActors);
        }
        let mut lanes: Vec<ActorLane> = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let lane = ActorLane::from_spec(index, spec, defaults, fonts)?;
            if lanes.iter().any(|l| l.alias == lane.alias) {
                return Err(LayoutError::DuplicateAlias { alias: lane.alias });
            }
            lanes.push(lane);
        }
        Ok(Self { lanes })
    }

    pub fn lanes(&self) -> &[ActorLane] {
        &self.lanes
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn index_of(&self, alias: &str) -> Option<usize> {
        self.lanes.iter().position(|l| l.alias == alias)
    }

    pub fn lane(&self, index: usize) -> &ActorLane {
        &self.lanes[index]
    }

    pub fn get(&self, alias: &str) -> Option<&ActorLane> {
        self.lanes.iter().find(|l| l.alias == alias)
    }

    /// Queue an activation interval for the next timeline pass
    pub fn set_flow(&mut self, index: usize, start: Option<f64>, end: Option<f64>) {
        if let Some(lane) = self.lanes.get_mut(index) {
            lane.pending = PendingFlow { start, end };
        }
    }

    /// Close every bar still running so the final timeline ends it
    pub fn close_continuing(&mut self, at_y: f64) {
        for lane in self.lanes.iter_mut().filter(|l| l.continuing) {
            lane.pending.end = Some(at_y);
        }
    }
}

/// Resolve an alias used by a line, logging near misses
pub fn lookup(working: &Working, alias: &str) -> Option<usize> {
    let found = working.actors.index_of(alias);
    if found.is_none() {
        let known: Vec<&str> = working.actors.lanes().iter().map(|l| l.alias.as_str()).collect();
        warn!(
            alias,
            suggestions = ?find_similar(&known, alias, 2),
            "line refers to an unknown actor"
        );
    }
    found
}

/// Draw all actor headers side by side at `start_y`
///
/// Headers are measured first so every box can take the tallest natural
/// height, then drawn.
pub fn draw_actors(
    working: &mut Working,
    surface: &mut dyn DrawSurface,
    start_y: f64,
) -> Result<Point, LayoutError> {
    let mut registry = ActorRegistry::from_specs(
        &working.document.actors,
        working.defaults("actor"),
        &working.fonts,
    )?;

    let mut blocks = Vec::with_capacity(registry.len());
    let mut next_x = working.start_x;
    let mut max_height: f64 = 0.0;
    for lane in registry.lanes.iter_mut() {
        let block = working.measure(&*surface, &lane.style, &lane.name);
        lane.left = next_x;
        lane.top = start_y;
        lane.width = block.width;
        lane.height = block.height;
        lane.middle = lane.left + lane.width / 2.0;
        max_height = max_height.max(block.height);
        next_x = lane.left + lane.width + lane.gap_to_next;
        blocks.push(block);
    }

    let mut max = Point::new(0.0, start_y);
    for (lane, block) in registry.lanes.iter_mut().zip(&blocks) {
        lane.height = max_height;
        debug!(alias = %lane.alias, x = lane.left, width = lane.width, "actor");

        let shadow = BoxStyle::filled(SHADOW_COLOUR);
        let shadow_rect = Rect::new(
            lane.left + SHADOW_OFFSET,
            lane.top + SHADOW_OFFSET,
            lane.width,
            lane.height,
        );
        draw_rectangle(surface, &shadow, shadow_rect, lane.radius, Borders::NONE, false);
        working.track(
            lane.left + SHADOW_OFFSET + lane.width,
            lane.top + SHADOW_OFFSET + lane.height,
        );

        let end = TextBox::new(&lane.name, &lane.style, lane.top, lane.left)
            .size(Some(lane.width), Some(lane.height))
            .radius(lane.radius)
            .measured(block)
            .draw(working, surface, false);
        max.x = max.x.max(end.x);
        max.y = max.y.max(end.y);
    }

    working.actors = registry;
    Ok(working.track_point(max))
}

/// Extra height that makes a timeline end on a whole dash period
pub fn dash_padding(dash: &[f64], min_height: f64) -> f64 {
    let period: f64 = dash.iter().sum();
    if period <= 0.0 {
        return 0.0;
    }
    if min_height < period {
        return period;
    }
    let rest = min_height % period;
    if rest == 0.0 {
        0.0
    } else {
        period - rest
    }
}

/// Bottom of the timelines a pass of at least `min_height` would draw
pub fn timeline_extent(working: &Working, start_y: f64, min_height: f64) -> f64 {
    working
        .actors
        .lanes()
        .iter()
        .map(|lane| start_y + min_height + dash_padding(&lane.timeline_dash, min_height))
        .fold(start_y + min_height, f64::max)
}

/// Gap cut into one lane's activation bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowBreak {
    pub lane: usize,
    pub at: f64,
    pub gap: f64,
}

/// One rectangle of an activation bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub top: f64,
    pub bottom: f64,
    pub top_border: bool,
    pub bottom_border: bool,
}

impl Bar {
    fn new(top: f64, bottom: f64, top_border: bool, bottom_border: bool) -> Self {
        Self {
            top,
            bottom,
            top_border,
            bottom_border,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    fn borders(&self) -> Borders {
        Borders {
            top: self.top_border,
            right: true,
            bottom: self.bottom_border,
            left: true,
        }
    }
}

/// Bars for one lane over `span`, and whether the bar continues afterwards
///
/// `window` is the break gap, already known to lie inside the span.
pub fn activation_bars(
    pending: PendingFlow,
    continuing: bool,
    span: (f64, f64),
    window: Option<(f64, f64)>,
) -> (Vec<Bar>, bool) {
    let (span_start, span_end) = span;
    let open_top = !continuing;
    let top_of = |start: f64| if continuing { span_start } else { start };

    let (mut bars, continues) = match (pending.start, pending.end, window) {
        (Some(s), Some(e), Some((b0, b1))) if b1 < e => (
            vec![Bar::new(top_of(s), b0, open_top, true), Bar::new(b1, e, true, true)],
            false,
        ),
        // a break reaching past the end leaves one bar down to the span end
        (Some(s), Some(_), Some(_)) => {
            (vec![Bar::new(top_of(s), span_end, open_top, true)], false)
        }
        (Some(s), Some(e), None) => (vec![Bar::new(top_of(s), e, open_top, true)], false),
        (Some(s), None, Some((b0, b1))) => (
            vec![
                Bar::new(top_of(s), b0, open_top, true),
                Bar::new(b1, span_end, true, false),
            ],
            true,
        ),
        (Some(s), None, None) => (vec![Bar::new(top_of(s), span_end, open_top, false)], true),
        (None, Some(e), Some((b0, b1))) if b1 < e => (
            vec![Bar::new(span_start, b0, open_top, true), Bar::new(b1, e, true, true)],
            false,
        ),
        (None, Some(e), _) => (vec![Bar::new(span_start, e, open_top, true)], false),
        (None, None, _) if continuing => {
            (vec![Bar::new(span_start, span_end, false, false)], true)
        }
        (None, None, _) => (Vec::new(), false),
    };
    bars.retain(|bar| bar.height() > 0.0);
    (bars, continues)
}

/// Draw every lane's timeline from `start_y` for at least `min_height`
///
/// Consumes each lane's pending activation interval. A mimic pass leaves the
/// continuation flags untouched.
pub fn draw_timelines(
    working: &mut Working,
    surface: &mut dyn DrawSurface,
    start_y: f64,
    min_height: f64,
    flow_break: Option<FlowBreak>,
    mimic: bool,
) -> Point {
    let mut max = Point::new(0.0, start_y);

    for index in 0..working.actors.len() {
        let lane = working.actors.lane(index);
        let end_y = start_y + min_height + dash_padding(&lane.timeline_dash, min_height);

        if !mimic {
            let path = Path::line(Point::new(lane.middle, start_y), Point::new(lane.middle, end_y));
            let stroke = Stroke::dashed(TIMELINE_COLOUR, lane.timeline_width, &lane.timeline_dash);
            surface.stroke_path(&path, &stroke);
        }
        max.x = max.x.max(lane.middle);
        max.y = max.y.max(end_y);

        let window = flow_break
            .filter(|b| {
                b.lane == index
                    && b.gap > 0.0
                    && b.at - b.gap / 2.0 > start_y
                    && b.at + b.gap / 2.0 < end_y
            })
            .map(|b| (b.at - b.gap / 2.0, b.at + b.gap / 2.0));

        let (bars, continues) =
            activation_bars(lane.pending, lane.continuing, (start_y, end_y), window);
        let style = BoxStyle {
            fill: lane.style.bg_colour.clone(),
            stroke: Stroke::solid(TIMELINE_COLOUR, 1.0),
        };
        let (left, width) = (lane.bar_left(), lane.flow_width);
        for bar in &bars {
            let rect = Rect::new(left, bar.top, width, bar.height());
            draw_rectangle(surface, &style, rect, 0.0, bar.borders(), mimic);
        }

        let lane = &mut working.actors.lanes[index];
        lane.pending = PendingFlow::default();
        if !mimic {
            lane.continuing = continues;
        }
    }

    working.track_point(max)
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (m, n) = (a_chars.len(), b_chars.len());
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for i in 1..=m {
        row[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[n]
}

/// Known aliases within a maximum edit distance, closest first
fn find_similar(known: &[&str], target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .iter()
        .map(|name| (*name, levenshtein_distance(name, target)))
        .filter(|(_, dist)| *dist > 0 && *dist <= max_distance)
        .collect();
    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect()
}
