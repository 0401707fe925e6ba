// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer event dispatch.
//!
//! Each pointer id runs its own small state machine:
//!
//! ```text
//!   idle ──down──► pressed ──move past jitter──► dragging
//!    ▲                │                             │
//!    └──────up────────┴────────────up───────────────┘
//! ```
//!
//! The dispatcher keeps three lists per pointer: the nodes it hovers, the
//! node it pressed, and the nodes that captured it on press (the drag
//! list). Releasing one pointer only ever touches that pointer's lists, so
//! concurrent touches never see each other's clicks.
//!
//! Hit testing and ancestor walks go through a [`HitTest`] host; the
//! dispatcher never looks at pixels or the scene store. Handlers receive the
//! host mutably and may change or dispose nodes while an event is being
//! delivered: every node is re-checked for liveness right before its
//! handlers run.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Vec2};
use strata_core::host::HitTest;
use strata_core::scene::NodeId;
use strata_core::trace::{DispatchEvent, Tracer};

use crate::normalize::{Button, Phase, PointerInput, PointerKind, RawInput, normalize};

/// The events a handler can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The pointer entered the node or one of its descendants.
    PointerOver,
    /// The pointer left the node and all of its descendants.
    PointerOut,
    /// A button or contact went down on the node.
    PointerDown,
    /// The pointer moved over the node, or moved while the node is being
    /// dragged.
    PointerMove,
    /// A button or contact was released over the node, or the node captured
    /// the pointer on press.
    PointerUp,
    /// Left press and release on the same node without moving.
    Click,
    /// Right-button click.
    RightClick,
    /// Middle-button click.
    MiddleClick,
    /// Second click on the same node within the double-click window.
    DoubleClick,
    /// Scroll over the node.
    Wheel,
    /// Any pointer movement, wherever it happens.
    GlobalPointerMove,
    /// Any release, wherever it happens.
    GlobalPointerUp,
}

impl EventKind {
    /// Lower-case name used in traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PointerOver => "pointer-over",
            Self::PointerOut => "pointer-out",
            Self::PointerDown => "pointer-down",
            Self::PointerMove => "pointer-move",
            Self::PointerUp => "pointer-up",
            Self::Click => "click",
            Self::RightClick => "right-click",
            Self::MiddleClick => "middle-click",
            Self::DoubleClick => "double-click",
            Self::Wheel => "wheel",
            Self::GlobalPointerMove => "global-pointer-move",
            Self::GlobalPointerUp => "global-pointer-up",
        }
    }

    /// Returns `true` for the kinds delivered regardless of position.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::GlobalPointerMove | Self::GlobalPointerUp)
    }
}

/// What a handler wants to happen after it ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Keep bubbling to the next ancestor.
    #[default]
    Continue,
    /// Stop after the current node. Other handlers on the same node still
    /// run.
    Stop,
}

/// The event handed to handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Pointer that caused it.
    pub pointer_id: u32,
    /// Device kind.
    pub pointer_kind: PointerKind,
    /// Pointer position in CSS pixels.
    pub point: Point,
    /// Button involved.
    pub button: Button,
    /// The node under the pointer (for clicks: the pressed node).
    pub target: Option<NodeId>,
    /// The node whose handler is running; `None` for global subscriptions.
    pub current: Option<NodeId>,
    /// Scroll delta for [`EventKind::Wheel`].
    pub delta: Vec2,
    /// Timestamp in milliseconds.
    pub time_ms: u64,
}

/// Cursor styles a node can request while hovered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Platform default.
    #[default]
    Default,
    /// A pointing hand.
    Pointer,
    /// An open hand.
    Grab,
    /// A closed hand.
    Grabbing,
    /// Four-way arrows.
    Move,
    /// A text caret.
    Text,
    /// A crosshair.
    Crosshair,
    /// The action is not allowed.
    NotAllowed,
}

/// Dispatcher tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchConfig {
    /// Largest distance, in CSS pixels, a pointer may travel between press
    /// and release for the release to count as a click.
    pub click_jitter: f64,
    /// Longest gap between two clicks of a double click.
    pub double_click_interval_ms: u64,
    /// Largest distance between two clicks of a double click.
    pub double_click_distance: f64,
    /// Idle time after the last touch activity at which the touch session
    /// ends and nodes can no longer cancel native gestures.
    pub touch_idle_timeout_ms: u64,
}

impl DispatchConfig {
    /// Three pixels of jitter, a 400 ms double click and a one second touch
    /// session.
    pub const DEFAULT: Self = Self {
        click_jitter: 3.0,
        double_click_interval_ms: 400,
        double_click_distance: 5.0,
        touch_idle_timeout_ms: 1000,
    };
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Handle returned by [`Dispatcher::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A running sequence of touch activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchSession {
    /// When the first contact went down.
    pub started_ms: u64,
    /// Most recent touch input.
    pub last_activity_ms: u64,
}

impl TouchSession {
    /// Whether the session is still open at `now_ms`.
    #[must_use]
    pub fn is_active(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) <= timeout_ms
    }
}

/// Result of one [`Dispatcher::handle`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Number of handler invocations.
    pub delivered: u32,
    /// The host should cancel the platform's native touch gesture.
    pub prevent_default: bool,
    /// The cursor changed to this style.
    pub cursor: Option<Cursor>,
}

impl DispatchOutcome {
    fn merge(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.prevent_default |= other.prevent_default;
        if other.cursor.is_some() {
            self.cursor = other.cursor;
        }
    }
}

type Handler<H> = Box<dyn FnMut(&mut H, &PointerEvent) -> Propagation>;

struct Subscription<H> {
    id: SubscriptionId,
    node: Option<NodeId>,
    kind: EventKind,
    handler: Handler<H>,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    target: NodeId,
    point: Point,
    button: Button,
    travel: f64,
}

#[derive(Clone, Debug, Default)]
struct PointerState {
    hovered: Vec<NodeId>,
    press: Option<Press>,
    dragging: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug)]
struct LastClick {
    node: NodeId,
    point: Point,
    time_ms: u64,
}

/// Per-call delivery bookkeeping.
struct Round<'r, 't> {
    tracer: &'r mut Tracer<'t>,
    delivered: u32,
}

/// Routes pointer input to node subscriptions.
pub struct Dispatcher<H> {
    config: DispatchConfig,
    subscriptions: Vec<Subscription<H>>,
    next_subscription: u64,
    pointers: HashMap<u32, PointerState>,
    draggable: HashSet<NodeId>,
    cancels_touch: HashSet<NodeId>,
    cursors: HashMap<NodeId, Cursor>,
    cursor: Cursor,
    touch: Option<TouchSession>,
    last_click: Option<LastClick>,
}

impl<H> core::fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions.len())
            .field("pointers", &self.pointers)
            .field("cursor", &self.cursor)
            .field("touch", &self.touch)
            .finish_non_exhaustive()
    }
}

impl<H: HitTest> Default for Dispatcher<H> {
    fn default() -> Self {
        Self::new(DispatchConfig::DEFAULT)
    }
}

impl<H: HitTest> Dispatcher<H> {
    /// Creates a dispatcher with no subscriptions.
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            subscriptions: Vec::new(),
            next_subscription: 0,
            pointers: HashMap::new(),
            draggable: HashSet::new(),
            cancels_touch: HashSet::new(),
            cursors: HashMap::new(),
            cursor: Cursor::Default,
            touch: None,
            last_click: None,
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    // -- Subscriptions --

    /// Runs `handler` for `kind` events delivered to `node`.
    ///
    /// Subscriptions to global kinds fire on every such event, wherever it
    /// happens, for as long as `node` is alive.
    pub fn subscribe(
        &mut self,
        node: NodeId,
        kind: EventKind,
        handler: impl FnMut(&mut H, &PointerEvent) -> Propagation + 'static,
    ) -> SubscriptionId {
        self.push_subscription(Some(node), kind, Box::new(handler))
    }

    /// Runs `handler` for every `kind` event that reaches any node, or for
    /// every global event of that kind.
    pub fn subscribe_global(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut H, &PointerEvent) -> Propagation + 'static,
    ) -> SubscriptionId {
        self.push_subscription(None, kind, Box::new(handler))
    }

    fn push_subscription(
        &mut self,
        node: Option<NodeId>,
        kind: EventKind,
        handler: Handler<H>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            node,
            kind,
            handler,
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    // -- Node behavior --

    /// Lets `node` keep receiving [`EventKind::PointerMove`] while it is
    /// pressed, even when the pointer leaves it.
    pub fn set_draggable(&mut self, node: NodeId, draggable: bool) {
        if draggable {
            self.draggable.insert(node);
        } else {
            self.draggable.remove(&node);
        }
    }

    /// Sets the cursor shown while the mouse hovers `node`. `None` reverts
    /// to whatever an ancestor requests.
    pub fn set_cursor(&mut self, node: NodeId, cursor: Option<Cursor>) {
        match cursor {
            Some(c) => self.cursors.insert(node, c),
            None => self.cursors.remove(&node),
        };
    }

    /// Lets touches on `node` cancel the platform's native gesture (scroll,
    /// zoom) during a touch session.
    pub fn set_cancels_touch_gesture(&mut self, node: NodeId, cancels: bool) {
        if cancels {
            self.cancels_touch.insert(node);
        } else {
            self.cancels_touch.remove(&node);
        }
    }

    /// Drops every subscription and setting of `node`.
    pub fn forget(&mut self, node: NodeId) {
        self.subscriptions.retain(|s| s.node != Some(node));
        self.draggable.remove(&node);
        self.cancels_touch.remove(&node);
        self.cursors.remove(&node);
        for state in self.pointers.values_mut() {
            state.hovered.retain(|n| *n != node);
            state.dragging.retain(|n| *n != node);
            if state.press.is_some_and(|p| p.target == node) {
                state.press = None;
            }
        }
    }

    // -- Queries --

    /// Whether any pointer is over `node` or one of its descendants.
    #[must_use]
    pub fn hovering(&self, node: NodeId) -> bool {
        self.pointers.values().any(|s| s.hovered.contains(&node))
    }

    /// Whether `node` captured a pointer that has since moved past the
    /// click jitter.
    #[must_use]
    pub fn dragging(&self, node: NodeId) -> bool {
        self.pointers.values().any(|s| {
            s.press.is_some_and(|p| p.travel > self.config.click_jitter)
                && s.dragging.contains(&node)
        })
    }

    /// Whether `node` captured a pointer that is still down.
    #[must_use]
    pub fn pressed(&self, node: NodeId) -> bool {
        self.pointers.values().any(|s| s.dragging.contains(&node))
    }

    /// The cursor currently requested by the node under the mouse.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The current touch session, if one is open at `now_ms`.
    #[must_use]
    pub fn touch_session(&self, now_ms: u64) -> Option<TouchSession> {
        self.touch
            .filter(|s| s.is_active(now_ms, self.config.touch_idle_timeout_ms))
    }

    // -- Input --

    /// Normalizes and dispatches a platform notification.
    pub fn handle_raw(&mut self, host: &mut H, raw: &RawInput) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        for input in normalize(raw) {
            outcome.merge(self.handle(host, &input));
        }
        outcome
    }

    /// Dispatches one pointer input.
    pub fn handle(&mut self, host: &mut H, input: &PointerInput) -> DispatchOutcome {
        self.handle_traced(host, input, &mut Tracer::none())
    }

    /// Like [`handle`](Self::handle), reporting every delivery to `tracer`.
    pub fn handle_traced(
        &mut self,
        host: &mut H,
        input: &PointerInput,
        tracer: &mut Tracer<'_>,
    ) -> DispatchOutcome {
        self.prune(host);
        if input.pointer_kind == PointerKind::Touch {
            self.touch_activity(input);
        }

        let mut round = Round {
            tracer,
            delivered: 0,
        };
        match input.phase {
            Phase::Move => self.on_move(host, input, &mut round),
            Phase::Down => self.on_down(host, input, &mut round),
            Phase::Up => self.on_up(host, input, &mut round),
            Phase::Cancel => self.on_cancel(host, input, &mut round),
            Phase::Wheel(delta) => self.on_wheel(host, input, delta, &mut round),
        }

        let prevent_default = input.pointer_kind == PointerKind::Touch
            && matches!(input.phase, Phase::Down | Phase::Move)
            && self.touch_session(input.time_ms).is_some()
            && self.pointers.get(&input.pointer_id).is_some_and(|s| {
                s.hovered
                    .iter()
                    .chain(&s.dragging)
                    .any(|n| self.cancels_touch.contains(n))
            });

        let cursor = self.resolve_cursor();
        let changed = (cursor != self.cursor).then_some(cursor);
        self.cursor = cursor;

        DispatchOutcome {
            delivered: round.delivered,
            prevent_default,
            cursor: changed,
        }
    }

    fn touch_activity(&mut self, input: &PointerInput) {
        let now = input.time_ms;
        let timeout = self.config.touch_idle_timeout_ms;
        if let Some(s) = &mut self.touch
            && s.is_active(now, timeout)
        {
            s.last_activity_ms = now;
        } else if input.phase == Phase::Down {
            self.touch = Some(TouchSession {
                started_ms: now,
                last_activity_ms: now,
            });
        } else {
            // Only a new contact opens a session.
            self.touch = None;
        }
    }

    fn on_move(&mut self, host: &mut H, input: &PointerInput, round: &mut Round<'_, '_>) {
        let hit = host.hit_test(input.point);
        let path = interactive_path(host, hit);
        self.update_hover(host, input, hit, &path, round);

        let state = self.pointers.entry(input.pointer_id).or_default();
        if let Some(press) = &mut state.press {
            press.travel = press.travel.max(press.point.distance(input.point));
        }
        let follow: Vec<NodeId> = state
            .dragging
            .iter()
            .filter(|n| self.draggable.contains(n) && !path.contains(n))
            .copied()
            .collect();

        let event = base_event(EventKind::PointerMove, input, hit);
        self.bubble(host, &path, &event, round);
        self.broadcast(host, &follow, &event, round);
        self.global(host, &base_event(EventKind::GlobalPointerMove, input, hit), round);
    }

    fn on_down(&mut self, host: &mut H, input: &PointerInput, round: &mut Round<'_, '_>) {
        let hit = host.hit_test(input.point);
        let path = interactive_path(host, hit);
        self.update_hover(host, input, hit, &path, round);

        let state = self.pointers.entry(input.pointer_id).or_default();
        state.press = path.first().map(|&target| Press {
            target,
            point: input.point,
            button: input.button,
            travel: 0.0,
        });
        state.dragging.clone_from(&path);

        self.bubble(host, &path, &base_event(EventKind::PointerDown, input, hit), round);
    }

    fn on_up(&mut self, host: &mut H, input: &PointerInput, round: &mut Round<'_, '_>) {
        let hit = host.hit_test(input.point);
        let path = interactive_path(host, hit);
        self.update_hover(host, input, hit, &path, round);

        let (press, dragging) = match self.pointers.get_mut(&input.pointer_id) {
            Some(state) => (state.press.take(), core::mem::take(&mut state.dragging)),
            None => (None, Vec::new()),
        };

        // Captured nodes always hear the release, whatever their handlers
        // return; nodes merely under the pointer get the usual bubbling.
        let up = base_event(EventKind::PointerUp, input, hit);
        self.broadcast(host, &dragging, &up, round);
        let rest: Vec<NodeId> = path
            .iter()
            .filter(|n| !dragging.contains(n))
            .copied()
            .collect();
        self.bubble(host, &rest, &up, round);

        if let Some(press) = press {
            let travel = press.travel.max(press.point.distance(input.point));
            if path.contains(&press.target) && travel <= self.config.click_jitter {
                self.click(host, input, press, round);
            }
        }

        self.global(host, &base_event(EventKind::GlobalPointerUp, input, hit), round);

        if input.pointer_kind != PointerKind::Mouse {
            self.release_pointer(host, input, round);
        }
    }

    fn click(
        &mut self,
        host: &mut H,
        input: &PointerInput,
        press: Press,
        round: &mut Round<'_, '_>,
    ) {
        let kind = match press.button {
            Button::Left => EventKind::Click,
            Button::Right => EventKind::RightClick,
            Button::Middle => EventKind::MiddleClick,
            Button::Other(_) => return,
        };
        let target = Some(press.target);
        let path = interactive_path(host, target);
        self.bubble(host, &path, &base_event(kind, input, target), round);
        if kind != EventKind::Click {
            return;
        }

        let double = self.last_click.is_some_and(|last| {
            last.node == press.target
                && input.time_ms.saturating_sub(last.time_ms)
                    <= self.config.double_click_interval_ms
                && last.point.distance(input.point) <= self.config.double_click_distance
        });
        if double {
            self.last_click = None;
            let event = base_event(EventKind::DoubleClick, input, target);
            self.bubble(host, &path, &event, round);
        } else {
            self.last_click = Some(LastClick {
                node: press.target,
                point: input.point,
                time_ms: input.time_ms,
            });
        }
    }

    fn on_cancel(&mut self, host: &mut H, input: &PointerInput, round: &mut Round<'_, '_>) {
        let dragging = match self.pointers.get_mut(&input.pointer_id) {
            Some(state) => {
                state.press = None;
                core::mem::take(&mut state.dragging)
            }
            None => return,
        };
        let up = base_event(EventKind::PointerUp, input, None);
        self.broadcast(host, &dragging, &up, round);
        self.release_pointer(host, input, round);
    }

    fn on_wheel(
        &mut self,
        host: &mut H,
        input: &PointerInput,
        delta: Vec2,
        round: &mut Round<'_, '_>,
    ) {
        let hit = host.hit_test(input.point);
        let path = interactive_path(host, hit);
        let event = PointerEvent {
            delta,
            ..base_event(EventKind::Wheel, input, hit)
        };
        self.bubble(host, &path, &event, round);
    }

    /// Sends pointer-out to everything the pointer hovered and forgets it.
    fn release_pointer(&mut self, host: &mut H, input: &PointerInput, round: &mut Round<'_, '_>) {
        if let Some(state) = self.pointers.remove(&input.pointer_id) {
            let out = base_event(EventKind::PointerOut, input, None);
            self.broadcast(host, &state.hovered, &out, round);
        }
    }

    /// Moves the pointer's hover set to `path`: pointer-out for nodes left
    /// (innermost first, always delivered), then pointer-over for nodes
    /// entered (bubbling from the hit node).
    fn update_hover(
        &mut self,
        host: &mut H,
        input: &PointerInput,
        hit: Option<NodeId>,
        path: &[NodeId],
        round: &mut Round<'_, '_>,
    ) {
        let state = self.pointers.entry(input.pointer_id).or_default();
        let old = core::mem::replace(&mut state.hovered, path.to_vec());
        let left: Vec<NodeId> = old.iter().filter(|n| !path.contains(n)).copied().collect();
        let entered: Vec<NodeId> = path.iter().filter(|n| !old.contains(n)).copied().collect();

        self.broadcast(host, &left, &base_event(EventKind::PointerOut, input, hit), round);
        self.bubble(host, &entered, &base_event(EventKind::PointerOver, input, hit), round);
    }

    // -- Delivery --

    /// Delivers to each node in order until a handler stops propagation.
    fn bubble(
        &mut self,
        host: &mut H,
        path: &[NodeId],
        event: &PointerEvent,
        round: &mut Round<'_, '_>,
    ) {
        for &node in path {
            if self.deliver(host, node, event, round) == Propagation::Stop {
                break;
            }
        }
    }

    /// Delivers to every node regardless of propagation.
    fn broadcast(
        &mut self,
        host: &mut H,
        nodes: &[NodeId],
        event: &PointerEvent,
        round: &mut Round<'_, '_>,
    ) {
        for &node in nodes {
            self.deliver(host, node, event, round);
        }
    }

    fn deliver(
        &mut self,
        host: &mut H,
        node: NodeId,
        event: &PointerEvent,
        round: &mut Round<'_, '_>,
    ) -> Propagation {
        let mut result = Propagation::Continue;
        let event = PointerEvent {
            current: Some(node),
            ..*event
        };
        for sub in &mut self.subscriptions {
            if sub.kind != event.kind || !(sub.node == Some(node) || sub.node.is_none()) {
                continue;
            }
            // A previous handler may have disposed the node.
            if !host.is_alive(node) {
                break;
            }
            round.tracer.dispatch(&DispatchEvent {
                kind: event.kind.name(),
                node,
                pointer_id: event.pointer_id,
            });
            round.delivered += 1;
            if (sub.handler)(host, &event) == Propagation::Stop {
                result = Propagation::Stop;
            }
        }
        result
    }

    /// Delivers a global kind to every subscriber of that kind.
    fn global(&mut self, host: &mut H, event: &PointerEvent, round: &mut Round<'_, '_>) {
        for sub in &mut self.subscriptions {
            if sub.kind != event.kind {
                continue;
            }
            if let Some(node) = sub.node {
                if !host.is_alive(node) {
                    continue;
                }
                round.tracer.dispatch(&DispatchEvent {
                    kind: event.kind.name(),
                    node,
                    pointer_id: event.pointer_id,
                });
            }
            round.delivered += 1;
            let event = PointerEvent {
                current: sub.node,
                ..*event
            };
            // Global events do not bubble; the return value is irrelevant.
            let _ = (sub.handler)(host, &event);
        }
    }

    /// Drops state that refers to disposed nodes.
    fn prune(&mut self, host: &H) {
        self.subscriptions
            .retain(|s| s.node.is_none_or(|n| host.is_alive(n)));
        self.draggable.retain(|n| host.is_alive(*n));
        self.cancels_touch.retain(|n| host.is_alive(*n));
        self.cursors.retain(|n, _| host.is_alive(*n));
        for state in self.pointers.values_mut() {
            state.hovered.retain(|n| host.is_alive(*n));
            state.dragging.retain(|n| host.is_alive(*n));
            if state.press.is_some_and(|p| !host.is_alive(p.target)) {
                state.press = None;
            }
        }
        if self
            .last_click
            .is_some_and(|c| !host.is_alive(c.node))
        {
            self.last_click = None;
        }
    }

    /// The cursor of the innermost node under the mouse that requests one.
    fn resolve_cursor(&self) -> Cursor {
        self.pointers
            .get(&crate::normalize::MOUSE_POINTER_ID)
            .and_then(|s| s.hovered.iter().find_map(|n| self.cursors.get(n)))
            .copied()
            .unwrap_or_default()
    }
}

/// The hit node and its interactive ancestors, innermost first.
fn interactive_path<H: HitTest>(host: &mut H, hit: Option<NodeId>) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut node = hit;
    while let Some(n) = node {
        if host.is_interactive(n) {
            path.push(n);
        }
        node = host.parent(n);
    }
    path
}

fn base_event(kind: EventKind, input: &PointerInput, target: Option<NodeId>) -> PointerEvent {
    PointerEvent {
        kind,
        pointer_id: input.pointer_id,
        pointer_kind: input.pointer_kind,
        point: input.point,
        button: input.button,
        target,
        current: None,
        delta: Vec2::ZERO,
        time_ms: input.time_ms,
    }
}
