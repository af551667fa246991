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

//! Moving frames between a socket actor and its attached pipes.
//!
//! [`Distributor`] fans outbound frames out to a chosen set of peers, dropping them
//! for peers at their high-water mark. [`FairQueue`] reads inbound frames from all
//! peers in turn.

mod distributor;
mod fair_queue;

pub use distributor::Distributor;
pub use fair_queue::FairQueue;
