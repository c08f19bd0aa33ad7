//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `device_list`  | DeviceView         | In-memory list widget    |
//! | `log_sink`     | EventSink          | `log` facade             |
//! | `sim_bus`      | BusTransport       | In-process simulated bus |
//! |                | ProxyObject        | Simulated peer devices   |

pub mod device_list;
pub mod log_sink;
pub mod sim_bus;
