/// Generates the `Message` enum over every wire struct, the matching
/// `MessageType` ids and the payload encode/decode dispatch.
macro_rules! device_message {
    ($($name:ident = $id:literal),* $(,)?) => {
        /// Wire identifier of each message, as carried in the frame header.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum MessageType {
            $($name = $id),*
        }

        impl MessageType {
            pub fn from_u16(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(Self::$name),)*
                    _ => None,
                }
            }

            pub fn id(self) -> u16 {
                self as u16
            }
        }

        #[derive(Clone, Debug, PartialEq)]
        pub enum Message {
            $($name($name)),*
        }

        impl Message {
            pub fn message_type(&self) -> MessageType {
                match self {
                    $(Self::$name(_) => MessageType::$name),*
                }
            }

            fn payload_len(&self) -> usize {
                match self {
                    $(Self::$name(m) => ::prost::Message::encoded_len(m)),*
                }
            }

            fn encode_payload(&self, buf: &mut Vec<u8>) -> Result<(), $crate::error::WireError> {
                match self {
                    $(Self::$name(m) => ::prost::Message::encode(m, buf)?),*
                }
                Ok(())
            }

            fn decode_payload(
                message_type: MessageType,
                payload: &[u8],
            ) -> Result<Self, $crate::error::WireError> {
                Ok(match message_type {
                    $(MessageType::$name => Self::$name(<$name as ::prost::Message>::decode(payload)?)),*
                })
            }
        }

        $(
            impl From<$name> for Message {
                fn from(x: $name) -> Self {
                    Self::$name(x)
                }
            }
        )*
    };
}

pub(crate) use device_message;
