pub mod bridge_protocol;
pub mod inbound;
pub mod outbound;
