//! Silvair Gateway Configuration model, vendor opcode 0xF03601.
//!
//! Configures the Ethernet side of a gateway: link MTU, MAC address, the
//! upstream server and either DHCP or a static IPv4 setup.

use std::fmt;
use std::net::Ipv4Addr;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{get_array, get_prefixed, get_u16, get_u8, invalid, put_prefixed, Codec};
use crate::config::StatusCode;
use crate::error::AccessResult;

/// IPv4 addresses travel in network order
impl Codec for Ipv4Addr {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_slice(&self.octets());
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_array::<4>(buf).map(Ipv4Addr::from)
    }
}

/// Ethernet MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Codec for MacAddress {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_slice(&self.0);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        get_array(buf).map(Self)
    }
}

fn get_server_address(buf: &mut Bytes) -> AccessResult<String> {
    let raw = get_prefixed(buf)?;
    String::from_utf8(raw.to_vec()).map_err(|_| invalid("server address", "bytes"))
}

fn put_server_address(buf: &mut BytesMut, address: &str) -> AccessResult<()> {
    put_prefixed(buf, address.as_bytes())
}

mesh_enum! {
    /// Address assignment mode
    pub enum DhcpFlag: u8 {
        /// Static addressing
        Disabled = 0x00,
        /// DHCP with a static DNS server
        EnabledStaticDns = 0x01,
        /// DHCP for addresses and DNS
        EnabledAutoDns = 0x02,
    }
}

mesh_enum! {
    /// Ethernet connection state
    pub enum ConnState: u8 {
        /// Idle
        Idle = 0x00,
        /// Applying configuration
        Configuring = 0x01,
        /// Bringing the interface up
        Initializing = 0x02,
        /// Connecting to the server
        Connecting = 0x03,
        /// Handshaking with the server
        Handshake = 0x04,
        /// Connected
        Connected = 0x05,
    }
}

mesh_enum! {
    /// Ethernet link state
    pub enum LinkStatus: u8 {
        /// No carrier
        Down = 0x00,
        /// Carrier present
        Up = 0x01,
    }
}

mesh_enum! {
    /// Last connection error
    pub enum LastError: u8 {
        /// No error
        NoError = 0x00,
        /// Operation not permitted
        Eperm = 0x01,
        /// No such device
        Enodev = 0x02,
        /// Address in use
        Eaddrinuse = 0x03,
        /// Protocol error
        Eproto = 0x04,
        /// Reserved
        Rfu1 = 0x05,
        /// Reserved
        Rfu2 = 0x06,
        /// Reserved
        Rfu3 = 0x07,
        /// Reserved
        Rfu4 = 0x08,
        /// Reserved
        Rfu5 = 0x09,
        /// Reserved
        Rfu6 = 0x0a,
        /// Reserved
        Rfu7 = 0x0b,
        /// Reserved
        Rfu8 = 0x0c,
        /// Reserved
        Rfu9 = 0x0d,
        /// Reserved
        Rfu10 = 0x0e,
        /// Unknown error
        Unknown = 0x0f,
    }
}

/// Link and server settings common to every configuration message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetConfig {
    /// Link MTU
    pub mtu_size: u16,
    /// Interface MAC address
    pub mac_address: MacAddress,
    /// Server TCP port
    pub server_port_number: u16,
    /// Reconnect interval in milliseconds
    pub reconnect_interval: u16,
    /// Server host name or address
    pub server_address: String,
}

impl Codec for EthernetConfig {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.mtu_size);
        self.mac_address.encode(buf)?;
        buf.put_u16_le(self.server_port_number);
        buf.put_u16_le(self.reconnect_interval);
        put_server_address(buf, &self.server_address)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            mtu_size: get_u16(buf)?,
            mac_address: MacAddress::decode(buf)?,
            server_port_number: get_u16(buf)?,
            reconnect_interval: get_u16(buf)?,
            server_address: get_server_address(buf)?,
        })
    }
}

/// Static IPv4 setup used when DHCP is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAddress {
    /// Interface address
    pub ip_address: Ipv4Addr,
    /// Default gateway
    pub gateway_ip_address: Ipv4Addr,
    /// Prefix length
    pub netmask: u8,
}

impl Codec for StaticAddress {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.ip_address.encode(buf)?;
        self.gateway_ip_address.encode(buf)?;
        buf.put_u8(self.netmask);
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            ip_address: Ipv4Addr::decode(buf)?,
            gateway_ip_address: Ipv4Addr::decode(buf)?,
            netmask: get_u8(buf)?,
        })
    }
}

/// Full configuration request.
///
/// Without a DNS server the gateway uses DHCP for everything; a static
/// address also requires a DNS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSet {
    /// Link and server settings
    #[serde(flatten)]
    pub ethernet: EthernetConfig,
    /// Static DNS server
    pub dns_ip_address: Option<Ipv4Addr>,
    /// Static address setup
    pub static_address: Option<StaticAddress>,
}

impl Codec for ConfigurationSet {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        self.ethernet.encode(buf)?;
        match (&self.dns_ip_address, &self.static_address) {
            (None, Some(_)) => Err(invalid(
                "gateway configuration",
                "static address without dns server",
            )),
            (dns, address) => {
                dns.encode(buf)?;
                address.encode(buf)
            }
        }
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            ethernet: EthernetConfig::decode(buf)?,
            dns_ip_address: Option::decode(buf)?,
            static_address: Option::decode(buf)?,
        })
    }
}

/// Configuration reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStatus {
    /// Ethernet chip revision
    pub chip_revision_id: u8,
    /// Link and server settings
    #[serde(flatten)]
    pub ethernet: EthernetConfig,
    /// DNS server
    pub dns_ip_address: Ipv4Addr,
    /// Address setup
    #[serde(flatten)]
    pub static_address: StaticAddress,
    /// Address assignment mode
    pub flags: DhcpFlag,
    /// Status code
    pub status_code: StatusCode,
}

impl Codec for ConfigurationStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(self.chip_revision_id);
        self.ethernet.encode(buf)?;
        self.dns_ip_address.encode(buf)?;
        self.static_address.encode(buf)?;
        self.flags.encode(buf)?;
        self.status_code.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            chip_revision_id: get_u8(buf)?,
            ethernet: EthernetConfig::decode(buf)?,
            dns_ip_address: Ipv4Addr::decode(buf)?,
            static_address: StaticAddress::decode(buf)?,
            flags: DhcpFlag::decode(buf)?,
            status_code: StatusCode::decode(buf)?,
        })
    }
}

/// Upstream server endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Server TCP port
    pub server_port_number: u16,
    /// Server host name or address
    pub server_address: String,
}

impl Codec for ServerEndpoint {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.server_port_number);
        put_server_address(buf, &self.server_address)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            server_port_number: get_u16(buf)?,
            server_address: get_server_address(buf)?,
        })
    }
}

/// Connection state packed into one byte: `[state:3][link:1][error:4]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Connection state
    pub conn_state: ConnState,
    /// Link state
    pub link_status: LinkStatus,
    /// Last error
    pub last_error: LastError,
}

impl Codec for ConnectionState {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u8(
            (u8::from(self.conn_state) << 5)
                | (u8::from(self.link_status) << 4)
                | u8::from(self.last_error),
        );
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        let packed = get_u8(buf)?;
        Ok(Self {
            conn_state: ConnState::try_from(packed >> 5)?,
            link_status: LinkStatus::try_from((packed >> 4) & 0x01)?,
            last_error: LastError::try_from(packed & 0x0f)?,
        })
    }
}

/// Ethernet traffic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketsStatus {
    /// Receive errors
    pub total_eth_rx_errors: u16,
    /// Transmit errors
    pub total_eth_tx_errors: u16,
    /// Bandwidth
    pub bandwidth: u16,
    /// Connection state
    pub connection_state: ConnectionState,
}

impl Codec for PacketsStatus {
    fn encode(&self, buf: &mut BytesMut) -> AccessResult<()> {
        buf.put_u16_le(self.total_eth_rx_errors);
        buf.put_u16_le(self.total_eth_tx_errors);
        buf.put_u16_le(self.bandwidth);
        self.connection_state.encode(buf)
    }

    fn decode(buf: &mut Bytes) -> AccessResult<Self> {
        Ok(Self {
            total_eth_rx_errors: get_u16(buf)?,
            total_eth_tx_errors: get_u16(buf)?,
            bandwidth: get_u16(buf)?,
            connection_state: ConnectionState::decode(buf)?,
        })
    }
}

access_messages! {
    /// Gateway configuration sub-opcodes
    subopcode GatewayConfigSubOpcode;
    /// Gateway configuration payloads
    payload GatewayConfigPayload {
        /// Read the configuration
        ConfigurationGet = 0x00,
        /// Replace the configuration
        ConfigurationSet(ConfigurationSet) = 0x01,
        /// Read traffic counters
        PacketsGet = 0x02,
        /// Reset traffic counters
        PacketsClear = 0x03,
        /// Set the link MTU
        MtuSizeSet(u16) = 0x04,
        /// Set the MAC address
        EthernetMacAddressSet(MacAddress) = 0x05,
        /// Set the server endpoint
        ServerAddressAndPortNumberSet(ServerEndpoint) = 0x06,
        /// Set the reconnect interval
        ReconnectIntervalSet(u16) = 0x07,
        /// Set the DNS server
        DnsIpAddressSet(Ipv4Addr) = 0x08,
        /// Set the interface address
        IpAddressSet(Ipv4Addr) = 0x09,
        /// Set the default gateway
        GatewayIpAddressSet(Ipv4Addr) = 0x0a,
        /// Set the prefix length
        NetmaskSet(u8) = 0x0b,
        /// Current configuration
        ConfigurationStatus(ConfigurationStatus) = 0x0c,
        /// Traffic counters
        PacketsStatus(PacketsStatus) = 0x0d,
    }
}
