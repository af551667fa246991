/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! SUB front-end.

use std::sync::Arc;
use tracing::debug;

use crate::config::{SocketConfig, SubFilterMethod};
use crate::error::{PubSubError, Result};
use crate::filter::{FilterRegistry, FilterTable};
use crate::frame::Frame;
use crate::observability::events;
use crate::pipe::{PeerId, Pipe};
use crate::socket::{SocketActor, XSub};
use crate::subscription_codec::{encode_subscription, FilterMethod, SubscriptionCommand};

const COMPONENT: &str = "sub";

/// Options a SUB socket accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SocketOption<'a> {
    /// Method used by subsequent subscribe/unsubscribe calls, as a raw option value:
    /// `0` for prefix matching, `1` for exact matching.
    FilterMethod(i64),
    Subscribe(&'a [u8]),
    Unsubscribe(&'a [u8]),
}

/// A filtering [`XSub`] driven by socket options. It only consumes: sending
/// application data fails.
#[derive(Debug)]
pub struct Sub {
    inner: XSub,
    filter_method: SubFilterMethod,
}

impl Sub {
    pub fn new(config: &SocketConfig) -> Self {
        Self::with_registry(config, Arc::new(FilterRegistry::default()))
    }

    pub fn with_registry(config: &SocketConfig, registry: Arc<FilterRegistry>) -> Self {
        let mut inner = XSub::with_registry(config, registry);
        inner.force_filtering();
        Self {
            inner,
            filter_method: config.sub.filter_method,
        }
    }

    pub fn set_option(&mut self, option: SocketOption<'_>) -> Result<()> {
        match option {
            SocketOption::FilterMethod(raw) => {
                let method = match raw {
                    0 => SubFilterMethod::Prefix,
                    1 => SubFilterMethod::Exact,
                    other => {
                        return Err(PubSubError::invalid_argument(format!(
                            "unsupported filter method {other:#x}"
                        )))
                    }
                };
                self.set_filter_method(method);
                Ok(())
            }
            SocketOption::Subscribe(topic) => self.subscribe(topic),
            SocketOption::Unsubscribe(topic) => self.unsubscribe(topic),
        }
    }

    pub fn set_filter_method(&mut self, method: SubFilterMethod) {
        if self.filter_method != method {
            debug!(
                event = events::FILTER_METHOD_CHANGED,
                component = COMPONENT,
                method = %FilterMethod::from(method),
                "filter method changed"
            );
        }
        self.filter_method = method;
    }

    pub fn filter_method(&self) -> FilterMethod {
        self.filter_method.into()
    }

    /// Subscribes to `topic` under the current filter method.
    pub fn subscribe(&mut self, topic: &[u8]) -> Result<()> {
        self.request(SubscriptionCommand::Subscribe, topic)
    }

    pub fn unsubscribe(&mut self, topic: &[u8]) -> Result<()> {
        self.request(SubscriptionCommand::Unsubscribe, topic)
    }

    pub fn filters(&self) -> &FilterTable {
        self.inner.filters()
    }

    fn request(&mut self, command: SubscriptionCommand, topic: &[u8]) -> Result<()> {
        let frame = Frame::new(encode_subscription(command, self.filter_method(), topic));
        self.inner.send(frame)
    }
}

impl Default for Sub {
    fn default() -> Self {
        Self::new(&SocketConfig::default())
    }
}

impl SocketActor for Sub {
    fn attach_peer(&mut self, pipe: Pipe) -> PeerId {
        self.inner.attach_peer(pipe)
    }

    fn read_activated(&mut self, peer: PeerId) {
        self.inner.read_activated(peer);
    }

    fn write_activated(&mut self, peer: PeerId) {
        self.inner.write_activated(peer);
    }

    fn hiccuped(&mut self, peer: PeerId) {
        self.inner.hiccuped(peer);
    }

    fn peer_terminated(&mut self, peer: PeerId) {
        self.inner.peer_terminated(peer);
    }

    fn send(&mut self, _frame: Frame) -> Result<()> {
        Err(PubSubError::NotSupported("send on a SUB socket"))
    }

    fn receive(&mut self) -> Result<Frame> {
        self.inner.receive()
    }

    fn has_outbound_capacity(&mut self) -> bool {
        false
    }

    fn has_inbound_data(&mut self) -> bool {
        self.inner.has_inbound_data()
    }
}

#[cfg(test)]
mod tests {
    use super::{SocketOption, Sub};
    use crate::config::{SocketConfig, SubFilterMethod};
    use crate::error::PubSubError;
    use crate::frame::Frame;
    use crate::socket::SocketActor;
    use crate::subscription_codec::FilterMethod;

    #[test]
    fn defaults_to_prefix_matching() {
        let mut sub = Sub::default();
        assert_eq!(sub.filter_method(), FilterMethod::PREFIX);

        sub.subscribe(b"a").expect("subscribe");
        assert!(sub.filters().matches(b"abc"));
    }

    #[test]
    fn config_selects_initial_method() {
        let mut config = SocketConfig::default();
        config.sub.filter_method = SubFilterMethod::Exact;
        let mut sub = Sub::new(&config);

        sub.subscribe(b"a").expect("subscribe");
        assert!(sub.filters().matches(b"a"));
        assert!(!sub.filters().matches(b"abc"));
    }

    #[test]
    fn unknown_filter_method_is_rejected_without_state_change() {
        let mut sub = Sub::default();
        sub.set_option(SocketOption::FilterMethod(1)).expect("exact");

        let err = sub
            .set_option(SocketOption::FilterMethod(0xdead_beef))
            .unwrap_err();
        assert!(matches!(err, PubSubError::InvalidArgument(_)));
        assert!(sub.set_option(SocketOption::FilterMethod(-1)).is_err());
        assert_eq!(sub.filter_method(), FilterMethod::EXACT);
    }

    #[test]
    fn options_drive_subscriptions() {
        let mut sub = Sub::default();
        sub.set_option(SocketOption::Subscribe(b"t")).expect("subscribe");
        assert!(sub.filters().matches(b"topic"));

        sub.set_option(SocketOption::Unsubscribe(b"t")).expect("unsubscribe");
        assert!(!sub.filters().matches(b"topic"));
    }

    #[test]
    fn sending_data_is_not_supported() {
        let mut sub = Sub::default();
        assert_eq!(
            sub.send(Frame::new("data")),
            Err(PubSubError::NotSupported("send on a SUB socket"))
        );
        assert!(!sub.has_outbound_capacity());
    }
}
