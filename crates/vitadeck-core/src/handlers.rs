use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use slotmap::SecondaryMap;

use crate::error::isolate;
use crate::node::{ChangedKeys, NodeId, PropKey};

pub type Callback = Rc<dyn Fn()>;

bitflags! {
    /// Which handlers a node carries.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HandlerFlags: u8 {
        const CLICK       = 1 << 0;
        const PRESS       = 1 << 1;
        const RELEASE     = 1 << 2;
        const HOVER_ENTER = 1 << 3;
        const HOVER_LEAVE = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerEvent {
    Click,
    Press,
    Release,
    HoverEnter,
    HoverLeave,
}

impl HandlerEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerEvent::Click => "click",
            HandlerEvent::Press => "press",
            HandlerEvent::Release => "release",
            HandlerEvent::HoverEnter => "hover-enter",
            HandlerEvent::HoverLeave => "hover-leave",
        }
    }
}

/// The event handlers attached to one element. Cloning shares the callbacks.
#[derive(Clone, Default)]
pub struct Handlers {
    pub on_click: Option<Callback>,
    pub on_press: Option<Callback>,
    pub on_release: Option<Callback>,
    pub on_hover_enter: Option<Callback>,
    pub on_hover_leave: Option<Callback>,
}

fn same(a: &Option<Callback>, b: &Option<Callback>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

impl PartialEq for Handlers {
    fn eq(&self, other: &Self) -> bool {
        same(&self.on_click, &other.on_click)
            && same(&self.on_press, &other.on_press)
            && same(&self.on_release, &other.on_release)
            && same(&self.on_hover_enter, &other.on_hover_enter)
            && same(&self.on_hover_leave, &other.on_hover_leave)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handlers").field(&self.flags()).finish()
    }
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }
    pub fn on_press(mut self, f: impl Fn() + 'static) -> Self {
        self.on_press = Some(Rc::new(f));
        self
    }
    pub fn on_release(mut self, f: impl Fn() + 'static) -> Self {
        self.on_release = Some(Rc::new(f));
        self
    }
    pub fn on_hover_enter(mut self, f: impl Fn() + 'static) -> Self {
        self.on_hover_enter = Some(Rc::new(f));
        self
    }
    pub fn on_hover_leave(mut self, f: impl Fn() + 'static) -> Self {
        self.on_hover_leave = Some(Rc::new(f));
        self
    }

    pub fn get(&self, event: HandlerEvent) -> Option<&Callback> {
        match event {
            HandlerEvent::Click => self.on_click.as_ref(),
            HandlerEvent::Press => self.on_press.as_ref(),
            HandlerEvent::Release => self.on_release.as_ref(),
            HandlerEvent::HoverEnter => self.on_hover_enter.as_ref(),
            HandlerEvent::HoverLeave => self.on_hover_leave.as_ref(),
        }
    }

    pub fn flags(&self) -> HandlerFlags {
        let mut flags = HandlerFlags::empty();
        flags.set(HandlerFlags::CLICK, self.on_click.is_some());
        flags.set(HandlerFlags::PRESS, self.on_press.is_some());
        flags.set(HandlerFlags::RELEASE, self.on_release.is_some());
        flags.set(HandlerFlags::HOVER_ENTER, self.on_hover_enter.is_some());
        flags.set(HandlerFlags::HOVER_LEAVE, self.on_hover_leave.is_some());
        flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }

    pub(crate) fn diff(&self, new: &Self, out: &mut ChangedKeys) {
        let pairs = [
            (&self.on_click, &new.on_click, PropKey::OnClick),
            (&self.on_press, &new.on_press, PropKey::OnPress),
            (&self.on_release, &new.on_release, PropKey::OnRelease),
            (
                &self.on_hover_enter,
                &new.on_hover_enter,
                PropKey::OnHoverEnter,
            ),
            (
                &self.on_hover_leave,
                &new.on_hover_leave,
                PropKey::OnHoverLeave,
            ),
        ];
        for (a, b, key) in pairs {
            if !same(a, b) {
                out.push(key);
            }
        }
    }
}

/// Runs one handler with panics contained. Returns `false` when it panicked;
/// the panic is logged and swallowed.
pub fn invoke_isolated(cb: &Callback, event: HandlerEvent, id: NodeId) -> bool {
    match isolate(|| cb()) {
        Ok(()) => true,
        Err(fault) => {
            log::error!(
                "{} handler of node {} panicked: {}",
                event.as_str(),
                id,
                fault
            );
            false
        }
    }
}

/// Handler registrations for one backend instance, keyed by node identity.
#[derive(Default)]
pub struct HandlerRegistry {
    map: SecondaryMap<NodeId, Handlers>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registration for `id`. An empty handler set removes it.
    pub fn register(&mut self, id: NodeId, handlers: &Handlers) {
        if handlers.is_empty() {
            self.map.remove(id);
        } else {
            self.map.insert(id, handlers.clone());
        }
    }

    pub fn deregister(&mut self, id: NodeId) -> Option<Handlers> {
        self.map.remove(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Handlers> {
        self.map.get(id)
    }

    /// Lookup by the identity string the native side knows the node by.
    pub fn get_encoded(&self, id: &str) -> Option<&Handlers> {
        NodeId::decode(id).and_then(|id| self.map.get(id))
    }

    /// Invokes the `event` handler of `id`, if registered. Returns whether a
    /// handler ran to completion.
    pub fn dispatch(&self, id: NodeId, event: HandlerEvent) -> bool {
        // Clone out so the handler may touch the registry owner.
        let Some(cb) = self.map.get(id).and_then(|h| h.get(event)).cloned() else {
            return false;
        };
        invoke_isolated(&cb, event, id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.map.iter().map(|(k, v)| (k, v.flags())))
            .finish()
    }
}
