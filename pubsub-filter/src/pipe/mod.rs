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

//! Pipe collaborator: peer handles, bounded pipe endpoints and their ownership table.

mod endpoint;
mod peer_id;
mod pipe_table;

pub use endpoint::Pipe;
pub use peer_id::PeerId;
pub use pipe_table::PipeTable;
