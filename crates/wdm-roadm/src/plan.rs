//! Channel plan generation.
//!
//! A [`PlanGenerator`] turns a plan intent into the ordered list of
//! [`ConnectionSpec`]s for one WSS module:
//!
//! - [`uniform_grid`](PlanGenerator::uniform_grid): all 95 channels between a
//!   fixed pair of ports, open or blocked per channel
//! - [`wide_channel`](PlanGenerator::wide_channel): a contiguous run of
//!   channels merged into one passband
//! - [`flex_grid`](PlanGenerator::flex_grid): per-channel or per-group port
//!   assignments, everything else on a default port
//! - [`grid_entries`](PlanGenerator::grid_entries): explicit
//!   `(port, start, end, attenuation)` windows
//!
//! Generation is pure; nothing here talks to a device.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use wdm_common::{WdmError, WdmResult};
use wdm_types::{channel_range, Channel, ParseError, WssModule, CHANNEL_QUANTITY};

use crate::connection::{resolve_module, ConnectionSpec};

/// Default per-connection WSS loss in dB.
pub const DEFAULT_WSS_LOSS: f64 = 4.0;

/// Default add/drop port offset for channels without an assignment.
pub const DEFAULT_PORT_OFFSET: u16 = 1;

/// A single channel or a contiguous group merged into one wide channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpan {
    Single(u32),
    Group(Vec<u32>),
}

impl ChannelSpan {
    /// Channels covered by this span, in order.
    pub fn channels(&self) -> &[u32] {
        match self {
            ChannelSpan::Single(ch) => std::slice::from_ref(ch),
            ChannelSpan::Group(chs) => chs,
        }
    }

    pub fn contains(&self, channel: u32) -> bool {
        self.channels().contains(&channel)
    }

    /// The channel the span is identified (and tested for blocking) by.
    pub fn first(&self) -> Option<u32> {
        self.channels().first().copied()
    }

    /// Checks that the span is non-empty, ascending without gaps and on
    /// the grid.
    pub fn validate(&self) -> WdmResult<()> {
        let channels = self.channels();
        if channels.is_empty() {
            return Err(WdmError::validation(
                "channel_span",
                "channel group must not be empty",
            ));
        }
        for &ch in channels {
            Channel::new(ch)?;
        }
        if channels.windows(2).any(|w| w[0].checked_add(1) != Some(w[1])) {
            return Err(WdmError::validation(
                "channel_span",
                format!("channels {:?} are not contiguous and ascending", channels),
            ));
        }
        Ok(())
    }

    /// Passband from the first channel's start to the last channel's end.
    pub fn window(&self) -> WdmResult<(f64, f64)> {
        self.validate()?;
        let channels = self.channels();
        let first = channel_range(channels[0])?;
        let last = channel_range(channels[channels.len() - 1])?;
        Ok((first.start, last.end))
    }
}

impl From<u32> for ChannelSpan {
    fn from(ch: u32) -> Self {
        ChannelSpan::Single(ch)
    }
}

impl From<Vec<u32>> for ChannelSpan {
    fn from(chs: Vec<u32>) -> Self {
        ChannelSpan::Group(chs)
    }
}

impl fmt::Display for ChannelSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSpan::Single(ch) => write!(f, "{}", ch),
            ChannelSpan::Group(chs) => match (chs.first(), chs.last()) {
                (Some(first), Some(last)) => write!(f, "{}-{}", first, last),
                _ => write!(f, "-"),
            },
        }
    }
}

/// Parses `"7"` as a single channel and `"3-5"` as a group.
impl FromStr for ChannelSpan {
    type Err = WdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim().parse::<u32>().map_err(|_| {
                WdmError::validation("channel_span", format!("'{}' is not a channel", s))
            })
        };
        match s.split_once('-') {
            None => Ok(ChannelSpan::Single(parse(s)?)),
            Some((lo, hi)) => {
                let (lo, hi) = (parse(lo)?, parse(hi)?);
                if lo > hi {
                    return Err(WdmError::validation(
                        "channel_span",
                        format!("'{}' runs backwards", s),
                    ));
                }
                Channel::new(lo)?;
                Channel::new(hi)?;
                Ok(ChannelSpan::Group((lo..=hi).collect()))
            }
        }
    }
}

/// Which modules `make_grid` rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridTarget {
    #[default]
    Both,
    Mux,
    Demux,
}

impl GridTarget {
    pub fn modules(&self) -> &'static [WssModule] {
        match self {
            GridTarget::Both => &WssModule::ALL,
            GridTarget::Mux => &[WssModule::Mux],
            GridTarget::Demux => &[WssModule::Demux],
        }
    }
}

impl FromStr for GridTarget {
    type Err = WdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(GridTarget::Both),
            "mux" => Ok(GridTarget::Mux),
            "demux" => Ok(GridTarget::Demux),
            _ => Err(WdmError::validation(
                "device",
                format!("'{}' is not one of both, mux, demux", s),
            )),
        }
    }
}

/// Loss and blocking inputs shared by every plan shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Base WSS loss in dB applied to every connection.
    pub base_loss: f64,
    /// Channels left unblocked.
    pub open_channels: BTreeSet<u32>,
    /// Extra attenuation in dB keyed by channel.
    pub extra_attenuation: BTreeMap<u32, f64>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            base_loss: DEFAULT_WSS_LOSS,
            open_channels: BTreeSet::new(),
            extra_attenuation: BTreeMap::new(),
        }
    }
}

impl GridOptions {
    pub fn with_open_channels(mut self, channels: impl IntoIterator<Item = u32>) -> Self {
        self.open_channels = channels.into_iter().collect();
        self
    }

    pub fn with_base_loss(mut self, loss: f64) -> Self {
        self.base_loss = loss;
        self
    }

    pub fn with_extra_attenuation(mut self, channel: u32, db: f64) -> Self {
        self.extra_attenuation.insert(channel, db);
        self
    }

    pub fn is_open(&self, channel: u32) -> bool {
        self.open_channels.contains(&channel)
    }

    /// Checks that every open channel and every extra-attenuation key is on
    /// the grid and that the losses are usable.
    pub fn validate(&self) -> WdmResult<()> {
        for &ch in self.open_channels.iter().chain(self.extra_attenuation.keys()) {
            Channel::new(ch)?;
        }
        if !self.base_loss.is_finite() || self.base_loss < 0.0 {
            return Err(WdmError::validation(
                "base_loss",
                format!("{} dB must be >= 0", self.base_loss),
            ));
        }
        if let Some((ch, db)) = self.extra_attenuation.iter().find(|(_, db)| !db.is_finite()) {
            return Err(WdmError::validation(
                "extra_attenuation",
                format!("channel {} has {} dB", ch, db),
            ));
        }
        Ok(())
    }

    /// Base loss plus the channel's extra attenuation.
    pub fn attenuation_for(&self, channel: u32) -> f64 {
        self.base_loss + self.extra_attenuation.get(&channel).copied().unwrap_or(0.0)
    }
}

/// Port assignments for a flexible grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexGridPlan {
    /// `(span, port offset)` in priority order; the first span containing a
    /// channel claims it.
    pub assignments: Vec<(ChannelSpan, u16)>,
    /// Port offset for channels no span covers.
    pub default_port: u16,
    /// Number of grid channels to cover, starting at channel 1.
    pub channel_quantity: u32,
}

impl Default for FlexGridPlan {
    fn default() -> Self {
        Self {
            assignments: Vec::new(),
            default_port: DEFAULT_PORT_OFFSET,
            channel_quantity: CHANNEL_QUANTITY,
        }
    }
}

impl FlexGridPlan {
    pub fn new(assignments: Vec<(ChannelSpan, u16)>) -> Self {
        Self {
            assignments,
            ..Self::default()
        }
    }

    pub fn with_default_port(mut self, offset: u16) -> Self {
        self.default_port = offset;
        self
    }

    /// Resolves every channel to a `(span, port offset)` pair.
    ///
    /// Each channel takes the first assignment that contains it, or the
    /// default port as a single-channel span. The result keeps one entry
    /// per distinct span, in the order the span was first reached; a span
    /// reached again keeps its position and takes the later port.
    /// Overlapping assignments are not rejected: a later span that first
    /// claims some channel still produces its own entry.
    pub fn resolve(&self) -> WdmResult<Vec<(ChannelSpan, u16)>> {
        if self.channel_quantity > CHANNEL_QUANTITY {
            return Err(ParseError::ChannelOutOfRange(self.channel_quantity).into());
        }
        for (span, _) in &self.assignments {
            span.validate()?;
        }

        let mut resolved: Vec<(ChannelSpan, u16)> = Vec::new();
        for channel in 1..=self.channel_quantity {
            let (span, port) = self
                .assignments
                .iter()
                .find(|(span, _)| span.contains(channel))
                .map(|(span, port)| (span.clone(), *port))
                .unwrap_or((ChannelSpan::Single(channel), self.default_port));

            match resolved.iter_mut().find(|(existing, _)| *existing == span) {
                Some(entry) => entry.1 = port,
                None => resolved.push((span, port)),
            }
        }
        Ok(resolved)
    }
}

/// One explicit window for [`PlanGenerator::grid_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    /// Add port (MUX) or drop port (DEMUX) offset, 1-20.
    pub port_offset: u16,
    pub start_freq: f64,
    pub end_freq: f64,
    pub attenuation: f64,
}

impl GridEntry {
    pub fn new(port_offset: u16, start_freq: f64, end_freq: f64, attenuation: f64) -> Self {
        Self {
            port_offset,
            start_freq,
            end_freq,
            attenuation,
        }
    }
}

/// Builds connection plans for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanGenerator {
    module: WssModule,
}

impl PlanGenerator {
    pub fn new(module: WssModule) -> Self {
        Self { module }
    }

    /// Resolves a device module number (1 or 2).
    pub fn for_module(module_id: u8) -> WdmResult<Self> {
        resolve_module(module_id).map(Self::new)
    }

    pub fn module(&self) -> WssModule {
        self.module
    }

    /// Ports of a connection whose add/drop side is `offset`.
    fn ports_for_offset(&self, offset: u16) -> (u16, u16) {
        let port = self.module.port_for_offset(offset);
        match self.module {
            WssModule::Mux => (port, self.module.common_port()),
            WssModule::Demux => (self.module.common_port(), port),
        }
    }

    /// All 95 channels between `input_port` and `output_port`, ascending.
    ///
    /// Channels in `options.open_channels` are unblocked; every other
    /// channel is blocked. Ids are the channel numbers.
    pub fn uniform_grid(
        &self,
        input_port: u16,
        output_port: u16,
        options: &GridOptions,
    ) -> WdmResult<Vec<ConnectionSpec>> {
        options.validate()?;
        let connections = Channel::all()
            .map(|ch| {
                let index = ch.as_u32();
                let window = ch.window();
                ConnectionSpec::new(
                    self.module,
                    index.to_string(),
                    input_port,
                    output_port,
                    (window.start, window.end),
                    options.attenuation_for(index),
                )
                .map(|conn| conn.with_blocked(!options.is_open(index)))
            })
            .collect::<WdmResult<Vec<_>>>()?;

        debug!(
            module = %self.module,
            open = options.open_channels.len(),
            "Generated uniform grid of {} connections",
            connections.len()
        );
        Ok(connections)
    }

    /// Merges `span` into one connection from the first channel's start to
    /// the last channel's end, identified by the first channel.
    ///
    /// The connection is blocked when `blocked` says so, or, with no
    /// override, when the span's first channel is not open. Extra
    /// attenuation is looked up by the first channel.
    pub fn wide_channel(
        &self,
        span: &ChannelSpan,
        input_port: u16,
        output_port: u16,
        options: &GridOptions,
        blocked: Option<bool>,
    ) -> WdmResult<ConnectionSpec> {
        options.validate()?;
        let window = span.window()?;
        let first = span.first().ok_or_else(|| {
            WdmError::validation("channel_span", "channel group must not be empty")
        })?;
        let blocked = blocked.unwrap_or(!options.is_open(first));

        ConnectionSpec::new(
            self.module,
            first.to_string(),
            input_port,
            output_port,
            window,
            options.attenuation_for(first),
        )
        .map(|conn| conn.with_blocked(blocked))
    }

    /// Flexible grid: each resolved span becomes one wide channel on its
    /// assigned add (MUX) or drop (DEMUX) port.
    ///
    /// Overlapping assignments are allowed as long as the spans they
    /// resolve to start on different channels; two spans starting on the
    /// same channel would share a connection id and are rejected.
    pub fn flex_grid(
        &self,
        plan: &FlexGridPlan,
        options: &GridOptions,
    ) -> WdmResult<Vec<ConnectionSpec>> {
        options.validate()?;
        let resolved = plan.resolve()?;

        let mut ids = BTreeSet::new();
        for (span, _) in &resolved {
            if let Some(first) = span.first() {
                if !ids.insert(first) {
                    return Err(WdmError::validation(
                        "assignments",
                        format!("more than one span starts at channel {} ({})", first, span),
                    ));
                }
            }
        }

        let connections = resolved
            .iter()
            .map(|(span, offset)| {
                let (input_port, output_port) = self.ports_for_offset(*offset);
                self.wide_channel(span, input_port, output_port, options, None)
            })
            .collect::<WdmResult<Vec<_>>>()?;

        debug!(
            module = %self.module,
            assignments = plan.assignments.len(),
            "Generated flex grid of {} connections",
            connections.len()
        );
        Ok(connections)
    }

    /// Explicit windows, unblocked, with 1-based positional ids.
    pub fn grid_entries(&self, entries: &[GridEntry]) -> WdmResult<Vec<ConnectionSpec>> {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let (input_port, output_port) = self.ports_for_offset(entry.port_offset);
                ConnectionSpec::new(
                    self.module,
                    (i + 1).to_string(),
                    input_port,
                    output_port,
                    (entry.start_freq, entry.end_freq),
                    entry.attenuation,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mux() -> PlanGenerator {
        PlanGenerator::new(WssModule::Mux)
    }

    #[test]
    fn test_uniform_grid_blocking() {
        let options = GridOptions::default().with_open_channels([1, 4, 8]);
        let plan = mux().uniform_grid(4101, 4201, &options).unwrap();

        assert_eq!(plan.len(), 95);
        assert_eq!(plan.iter().filter(|c| !c.is_blocked()).count(), 3);

        let ch4 = &plan[3];
        assert_eq!(ch4.connection_id(), "4");
        assert_eq!(ch4.label(), "CH4");
        assert!(!ch4.is_blocked());
        assert_eq!(ch4.attenuation_text(), "4.00");
        assert_eq!(ch4.start_freq(), 191475.0);
        assert_eq!(ch4.end_freq(), 191525.0);
    }

    #[test]
    fn test_uniform_grid_blocking_any_subset() {
        let mut subsets: Vec<Vec<u32>> = vec![
            vec![],
            (1..=95).collect(),
            (1..=95).step_by(2).collect(),
            vec![1, 95],
        ];
        subsets.extend((1..=95).map(|ch| vec![ch]));

        for open in subsets {
            let options = GridOptions::default().with_open_channels(open.iter().copied());
            let plan = mux().uniform_grid(4101, 4201, &options).unwrap();
            assert_eq!(plan.len(), 95);
            assert_eq!(
                plan.iter().filter(|c| !c.is_blocked()).count(),
                open.len(),
                "open channels {:?}",
                open
            );
            for conn in &plan {
                let ch: u32 = conn.connection_id().parse().unwrap();
                assert_eq!(conn.is_blocked(), !open.contains(&ch));
            }
        }
    }

    #[test]
    fn test_uniform_grid_rejects_off_grid_options() {
        let open = GridOptions::default().with_open_channels([4, 200]);
        assert!(matches!(
            mux().uniform_grid(4101, 4201, &open),
            Err(WdmError::Domain(_))
        ));

        let extra = GridOptions::default().with_extra_attenuation(0, 1.0);
        assert!(matches!(
            mux().uniform_grid(4101, 4201, &extra),
            Err(WdmError::Domain(_))
        ));

        let loss = GridOptions::default().with_base_loss(f64::NAN);
        assert!(matches!(
            mux().uniform_grid(4101, 4201, &loss),
            Err(WdmError::Validation { .. })
        ));
    }

    #[test]
    fn test_uniform_grid_order_and_extra_attenuation() {
        let options = GridOptions::default()
            .with_base_loss(2.0)
            .with_extra_attenuation(10, 1.25);
        let plan = mux().uniform_grid(4105, 4201, &options).unwrap();
        let ids: Vec<u32> = plan
            .iter()
            .map(|c| c.connection_id().parse().unwrap())
            .collect();
        assert_eq!(ids, (1..=95).collect::<Vec<_>>());
        assert_eq!(plan[9].attenuation_text(), "3.25");
        assert_eq!(plan[10].attenuation_text(), "2.00");
        assert!(plan.iter().all(|c| c.is_blocked()));
    }

    #[test]
    fn test_uniform_grid_wrong_port() {
        let err = mux()
            .uniform_grid(5101, 4201, &GridOptions::default())
            .unwrap_err();
        assert!(matches!(err, WdmError::Validation { .. }));
    }

    #[test]
    fn test_wide_channel_span() {
        let span = ChannelSpan::Group(vec![3, 4, 5]);
        let conn = mux()
            .wide_channel(&span, 4102, 4201, &GridOptions::default(), None)
            .unwrap();
        assert_eq!(conn.start_freq(), channel_range(3).unwrap().start);
        assert_eq!(conn.end_freq(), channel_range(5).unwrap().end);
        assert_eq!(conn.connection_id(), "3");
        assert_eq!(conn.label(), "CH3");
        assert!(conn.is_blocked());
    }

    #[test]
    fn test_wide_channel_override() {
        let options = GridOptions::default().with_open_channels([3]);
        let span = ChannelSpan::Single(3);
        let open = mux().wide_channel(&span, 4101, 4201, &options, None).unwrap();
        assert!(!open.is_blocked());
        let forced = mux()
            .wide_channel(&span, 4101, 4201, &options, Some(true))
            .unwrap();
        assert!(forced.is_blocked());
    }

    #[test]
    fn test_span_validate_off_grid_before_contiguity() {
        assert!(matches!(
            ChannelSpan::Group(vec![u32::MAX, 0]).validate(),
            Err(WdmError::Domain(_))
        ));
        assert!(matches!(
            ChannelSpan::Group(vec![94, 95, 96]).validate(),
            Err(WdmError::Domain(_))
        ));
        assert!(matches!(
            ChannelSpan::Group(vec![4, 3]).validate(),
            Err(WdmError::Validation { .. })
        ));
    }

    #[test]
    fn test_wide_channel_rejects_bad_spans() {
        let options = GridOptions::default();
        let empty = mux().wide_channel(&ChannelSpan::Group(vec![]), 4101, 4201, &options, None);
        assert!(matches!(empty, Err(WdmError::Validation { .. })));

        let gap = mux().wide_channel(&ChannelSpan::Group(vec![3, 5]), 4101, 4201, &options, None);
        assert!(matches!(gap, Err(WdmError::Validation { .. })));

        let off_grid =
            mux().wide_channel(&ChannelSpan::Group(vec![95, 96]), 4101, 4201, &options, None);
        assert!(matches!(off_grid, Err(WdmError::Domain(_))));
    }

    #[test]
    fn test_flex_grid_default_fill() {
        let plan = FlexGridPlan::new(vec![
            (ChannelSpan::Group(vec![3, 4, 5]), 2),
            (ChannelSpan::Single(9), 4),
        ]);
        let options = GridOptions::default().with_open_channels([3, 9]);
        let conns = mux().flex_grid(&plan, &options).unwrap();

        // 95 channels, three of them folded into one group.
        assert_eq!(conns.len(), 93);
        let ids: Vec<&str> = conns.iter().take(5).map(|c| c.connection_id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "6", "7"]);

        let group = &conns[2];
        assert_eq!(group.input_port(), 4102);
        assert_eq!(group.end_freq(), channel_range(5).unwrap().end);
        assert!(!group.is_blocked());

        let nine = conns.iter().find(|c| c.connection_id() == "9").unwrap();
        assert_eq!(nine.input_port(), 4104);
        assert!(!nine.is_blocked());

        assert_eq!(conns[0].input_port(), 4101);
        assert!(conns[0].is_blocked());
    }

    #[test]
    fn test_flex_grid_overlap_first_match_wins() {
        // Channel 5 sits in both groups; the first assignment claims it,
        // and the second group still emits because it first-claims 6.
        let plan = FlexGridPlan::new(vec![
            (ChannelSpan::Group(vec![3, 4, 5]), 2),
            (ChannelSpan::Group(vec![5, 6]), 4),
        ]);
        let resolved = plan.resolve().unwrap();
        let groups: Vec<&(ChannelSpan, u16)> = resolved
            .iter()
            .filter(|(span, _)| matches!(span, ChannelSpan::Group(_)))
            .collect();
        assert_eq!(
            groups,
            vec![
                &(ChannelSpan::Group(vec![3, 4, 5]), 2),
                &(ChannelSpan::Group(vec![5, 6]), 4)
            ]
        );
        assert!(!resolved.contains(&(ChannelSpan::Single(5), DEFAULT_PORT_OFFSET)));
        assert!(!resolved.contains(&(ChannelSpan::Single(6), DEFAULT_PORT_OFFSET)));

        let conns = mux().flex_grid(&plan, &GridOptions::default()).unwrap();
        let second = conns.iter().find(|c| c.input_port() == 4104).unwrap();
        assert_eq!(second.connection_id(), "5");
        assert_eq!(second.start_freq(), channel_range(5).unwrap().start);
    }

    #[test]
    fn test_flex_grid_rejects_spans_sharing_a_start() {
        // Channel 5 goes to the single, channel 6 to the group that also
        // starts at 5, so both would be connection "5".
        let plan = FlexGridPlan::new(vec![
            (ChannelSpan::Single(5), 2),
            (ChannelSpan::Group(vec![5, 6]), 4),
        ]);
        let err = mux().flex_grid(&plan, &GridOptions::default()).unwrap_err();
        assert!(matches!(err, WdmError::Validation { ref field, .. } if field == "assignments"));
    }

    #[test]
    fn test_flex_grid_group_blocking_uses_first_channel() {
        let plan = FlexGridPlan::new(vec![(ChannelSpan::Group(vec![10, 11]), 3)]);
        let open_second = GridOptions::default().with_open_channels([11]);
        let conns = mux().flex_grid(&plan, &open_second).unwrap();
        let group = conns.iter().find(|c| c.connection_id() == "10").unwrap();
        assert!(group.is_blocked());
    }

    #[test]
    fn test_flex_grid_demux_ports() {
        let plan = FlexGridPlan::new(vec![(ChannelSpan::Single(1), 7)]).with_default_port(2);
        let conns = PlanGenerator::new(WssModule::Demux)
            .flex_grid(&plan, &GridOptions::default())
            .unwrap();
        assert_eq!(conns[0].input_port(), 5101);
        assert_eq!(conns[0].output_port(), 5207);
        assert_eq!(conns[1].output_port(), 5202);
    }

    #[test]
    fn test_flex_grid_bounds() {
        let plan = FlexGridPlan {
            channel_quantity: 96,
            ..FlexGridPlan::default()
        };
        assert!(matches!(plan.resolve(), Err(WdmError::Domain(_))));

        let bad_port = FlexGridPlan::new(vec![(ChannelSpan::Single(1), 21)]);
        assert!(mux().flex_grid(&bad_port, &GridOptions::default()).is_err());
    }

    #[test]
    fn test_grid_entries() {
        let entries = [
            GridEntry::new(3, 191325.0, 191425.0, 5.0),
            GridEntry::new(1, 191425.0, 191437.5, 0.5),
        ];
        let conns = PlanGenerator::new(WssModule::Demux)
            .grid_entries(&entries)
            .unwrap();
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].connection_id(), "1");
        assert_eq!(conns[0].output_port(), 5203);
        assert_eq!(conns[1].label(), "CH2");
        assert_eq!(conns[1].attenuation_text(), "0.50");
        assert!(conns.iter().all(|c| !c.is_blocked()));
    }

    #[test]
    fn test_for_module() {
        assert!(PlanGenerator::for_module(1).is_ok());
        assert!(matches!(
            PlanGenerator::for_module(3),
            Err(WdmError::Validation { .. })
        ));
    }

    #[test]
    fn test_channel_span_parse() {
        assert_eq!("7".parse::<ChannelSpan>().unwrap(), ChannelSpan::Single(7));
        assert_eq!(
            "3-5".parse::<ChannelSpan>().unwrap(),
            ChannelSpan::Group(vec![3, 4, 5])
        );
        assert!("5-3".parse::<ChannelSpan>().is_err());
        assert!(matches!(
            "1-50000000".parse::<ChannelSpan>(),
            Err(WdmError::Domain(_))
        ));
        assert!(matches!("0-3".parse::<ChannelSpan>(), Err(WdmError::Domain(_))));
        assert!("x".parse::<ChannelSpan>().is_err());
        assert_eq!(ChannelSpan::Group(vec![3, 4, 5]).to_string(), "3-5");
    }

    #[test]
    fn test_grid_target() {
        assert_eq!("Both".parse::<GridTarget>().unwrap(), GridTarget::Both);
        assert_eq!(GridTarget::Demux.modules(), &[WssModule::Demux]);
        assert!("line".parse::<GridTarget>().is_err());
    }
}
