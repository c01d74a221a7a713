//! CNVS discovery by USB identity.

use super::transport::{EndpointInfo, Transport};
use crate::{CNVS_PIDS, CNVS_VID};
use tracing::{debug, info, warn};

/// Returns true if the endpoint carries the CNVS vendor and product IDs.
pub fn is_cnvs(endpoint: &EndpointInfo) -> bool {
    endpoint.vendor_id == Some(CNVS_VID)
        && endpoint
            .product_id
            .is_some_and(|pid| CNVS_PIDS.contains(&pid))
}

/// Finds the first CNVS endpoint in enumeration order.
///
/// Runs a single enumeration and never retries; an enumeration error counts
/// as an empty port list.
pub fn locate<T: Transport + ?Sized>(transport: &T) -> Option<String> {
    let endpoints = match transport.list_endpoints() {
        Ok(endpoints) => endpoints,
        Err(e) => {
            warn!("Serial port enumeration failed: {}", e);
            return None;
        }
    };

    if endpoints.is_empty() {
        info!("No serial ports detected");
        return None;
    }

    for endpoint in &endpoints {
        debug!(
            "Found serial port: {} (VID:{:04X?} PID:{:04X?})",
            endpoint.name, endpoint.vendor_id, endpoint.product_id
        );
    }

    match endpoints.into_iter().find(is_cnvs) {
        Some(endpoint) => {
            info!("CNVS found on {}", endpoint.name);
            Some(endpoint.name)
        }
        None => {
            info!("CNVS device not found");
            None
        }
    }
}
