//! Declarative builders for enumerated fields and opcode families.

/// Fixed-width enumerated field with strict `TryFrom` validation.
macro_rules! mesh_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl TryFrom<$repr> for $name {
            type Error = $crate::error::AccessError;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    _ => Err($crate::error::AccessError::Enum {
                        name: stringify!($name),
                        value: i64::from(value),
                    }),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> $repr {
                value as $repr
            }
        }

        impl $crate::codec::Codec for $name {
            fn encode(&self, buf: &mut bytes::BytesMut) -> $crate::error::AccessResult<()> {
                $crate::codec::Primitive::put(<$repr>::from(*self), buf);
                Ok(())
            }

            fn decode(buf: &mut bytes::Bytes) -> $crate::error::AccessResult<Self> {
                let raw: $repr = $crate::codec::Primitive::get(buf)?;
                $name::try_from(raw)
            }
        }
    };
}

/// Opcode family: a closed opcode enum plus a message enum whose variants
/// carry the parameters of each opcode.
///
/// The `opcode` form keys messages by access opcode; the `subopcode` form
/// keys vendor payloads by the single byte following a vendor opcode.
macro_rules! access_messages {
    (@pat $message:ident $variant:ident) => { $message::$variant };
    (@pat $message:ident $variant:ident $ty:ty) => { $message::$variant(_) };

    (@bind $message:ident $variant:ident $params:ident) => { $message::$variant };
    (@bind $message:ident $variant:ident $params:ident $ty:ty) => { $message::$variant($params) };

    (@encode $params:ident $buf:ident) => { Ok(()) };
    (@encode $params:ident $buf:ident $ty:ty) => {
        $crate::codec::Codec::encode($params, $buf)
    };

    (@decode $message:ident $variant:ident $buf:ident) => { $message::$variant };
    (@decode $message:ident $variant:ident $buf:ident $ty:ty) => {
        $message::$variant(<$ty as $crate::codec::Codec>::decode($buf)?)
    };

    (
        $(#[$ometa:meta])*
        opcode $opcode:ident;
        $(#[$mmeta:meta])*
        message $message:ident {
            $( $(#[$vmeta:meta])* $variant:ident $( ( $ty:ty ) )? = $value:literal, )+
        }
    ) => {
        $(#[$ometa])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $opcode {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $opcode {
            /// Numeric opcode value
            pub const fn value(self) -> u32 {
                self as u32
            }
        }

        impl TryFrom<u32> for $opcode {
            type Error = $crate::error::AccessError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($opcode::$variant), )+
                    _ => Err($crate::error::AccessError::Opcode(value)),
                }
            }
        }

        impl From<$opcode> for u32 {
            fn from(opcode: $opcode) -> u32 {
                opcode.value()
            }
        }

        $(#[$mmeta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "opcode", content = "params", rename_all = "snake_case")]
        pub enum $message {
            $( $(#[$vmeta])* $variant $( ($ty) )?, )+
        }

        impl $message {
            /// Opcode of this message
            pub fn opcode(&self) -> $opcode {
                match self {
                    $( access_messages!(@pat $message $variant $($ty)?) => $opcode::$variant, )+
                }
            }

            /// Encode the opcode followed by the parameters
            pub fn encode(&self, buf: &mut bytes::BytesMut) -> $crate::error::AccessResult<()> {
                $crate::opcode::put_opcode(self.opcode().value(), buf)?;
                self.encode_params(buf)
            }

            /// Encode the parameters only
            pub fn encode_params(
                &self,
                buf: &mut bytes::BytesMut,
            ) -> $crate::error::AccessResult<()> {
                match self {
                    $(
                        access_messages!(@bind $message $variant params $($ty)?) => {
                            access_messages!(@encode params buf $($ty)?)
                        }
                    )+
                }
            }

            /// Encode into a fresh buffer
            pub fn to_bytes(&self) -> $crate::error::AccessResult<bytes::Bytes> {
                let mut buf = bytes::BytesMut::new();
                self.encode(&mut buf)?;
                Ok(buf.freeze())
            }

            /// Decode an opcode and its parameters
            pub fn decode(buf: &mut bytes::Bytes) -> $crate::error::AccessResult<Self> {
                let opcode = $opcode::try_from($crate::opcode::get_opcode(buf)?)?;
                Self::decode_params(opcode, buf)
            }

            /// Decode the parameters of `opcode`; the whole buffer must be consumed
            pub fn decode_params(
                opcode: $opcode,
                buf: &mut bytes::Bytes,
            ) -> $crate::error::AccessResult<Self> {
                let message = match opcode {
                    $(
                        $opcode::$variant => {
                            access_messages!(@decode $message $variant buf $($ty)?)
                        }
                    )+
                };
                $crate::codec::finish(buf)?;
                Ok(message)
            }
        }
    };

    (
        $(#[$ometa:meta])*
        subopcode $subopcode:ident;
        $(#[$mmeta:meta])*
        payload $payload:ident {
            $( $(#[$vmeta:meta])* $variant:ident $( ( $ty:ty ) )? = $value:literal, )+
        }
    ) => {
        mesh_enum! {
            $(#[$ometa])*
            pub enum $subopcode: u8 {
                $( $(#[$vmeta])* $variant = $value, )+
            }
        }

        $(#[$mmeta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "subopcode", content = "payload", rename_all = "snake_case")]
        pub enum $payload {
            $( $(#[$vmeta])* $variant $( ($ty) )?, )+
        }

        impl $payload {
            /// Sub-opcode of this payload
            pub fn subopcode(&self) -> $subopcode {
                match self {
                    $( access_messages!(@pat $payload $variant $($ty)?) => $subopcode::$variant, )+
                }
            }
        }

        impl $crate::codec::Codec for $payload {
            fn encode(&self, buf: &mut bytes::BytesMut) -> $crate::error::AccessResult<()> {
                bytes::BufMut::put_u8(buf, u8::from(self.subopcode()));
                match self {
                    $(
                        access_messages!(@bind $payload $variant params $($ty)?) => {
                            access_messages!(@encode params buf $($ty)?)
                        }
                    )+
                }
            }

            fn decode(buf: &mut bytes::Bytes) -> $crate::error::AccessResult<Self> {
                let subopcode = $subopcode::try_from($crate::codec::get_u8(buf)?)?;
                Ok(match subopcode {
                    $(
                        $subopcode::$variant => {
                            access_messages!(@decode $payload $variant buf $($ty)?)
                        }
                    )+
                })
            }
        }
    };
}
