// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use tdcore_tl_types as tl;

/// Extensions for making working with updates easier.
pub trait UpdateExt {
    /// Extract the raw message contained in this update, if any.
    fn message(&self) -> Option<&tl::enums::Message>;
}

impl UpdateExt for tl::enums::Update {
    fn message(&self) -> Option<&tl::enums::Message> {
        match self {
            tl::enums::Update::NewMessage(tl::types::UpdateNewMessage { message, .. }) => {
                Some(message)
            }
            tl::enums::Update::NewChannelMessage(tl::types::UpdateNewChannelMessage {
                message,
                ..
            }) => Some(message),
            _ => None,
        }
    }
}
