//! Transcript output
//!
//! Prints both phases of an exchange verbatim for the tester: outgoing
//! requests under `▶▶▶▶▶`, server replies under `◀◀◀◀◀`.

use colored::Colorize;

use crate::common::Error;
use crate::dispatch::{DeviceRecord, HttpRequest, HttpResponse, Observer};
use crate::table::RequestDescriptor;

/// Heading for one test case of a run
pub fn test_case_header(id: &str, descriptor: &RequestDescriptor) {
    match &descriptor.description {
        Some(desc) => println!("\n{} {}", id.white().bold(), format!("({})", desc).dimmed()),
        None => println!("\n{}", id.white().bold()),
    }
}

/// Outgoing request, with its JSON body if any
pub fn outgoing(label: &str, request: &HttpRequest) {
    println!("\n{} {}", "▶▶▶▶▶".cyan(), format!("({})", label).dimmed());
    println!("{}", request);
    if let Some(body) = &request.body {
        println!("{}", body);
    }
}

/// Raw server reply
pub fn incoming(response: &HttpResponse) {
    println!("{}", "◀◀◀◀◀".cyan());
    let status = response.status.to_string();
    if response.is_success() {
        println!("{}", status.green());
    } else {
        println!("{}", status.yellow());
    }
    println!("{}", response.body);
}

/// Endpoint picked from the client list
pub fn device_id(endpoint: &str) {
    println!("DeviceID: {}", endpoint.bold());
}

/// Prints each message of an execution as the dispatcher sends or receives it
pub struct Transcript;

impl Observer for Transcript {
    fn discovery_sent(&mut self, request: &HttpRequest) {
        outgoing("Find deviceID", request);
    }

    fn discovery_received(&mut self, response: &HttpResponse) {
        incoming(response);
    }

    fn endpoint_resolved(&mut self, endpoint: &str) {
        device_id(endpoint);
    }

    fn operation_sent(&mut self, endpoint: &str, request: &HttpRequest) {
        outgoing(&format!("Send request to client {}", endpoint), request);
    }

    fn operation_received(&mut self, response: &HttpResponse) {
        incoming(response);
    }
}

/// Diagnostic for a failed test case
///
/// Goes to stdout with the rest of the transcript.
pub fn diagnostic(error: &Error) {
    println!("{} {}", "✗".red(), error);
}

/// Detailed view of a single test case for `show`
pub fn descriptor(id: &str, descriptor: &RequestDescriptor, url_template: &str) {
    println!("{}", id.white().bold());
    if let Some(desc) = &descriptor.description {
        println!("  {}", desc.dimmed());
    }
    println!("  Method:  {}", descriptor.method);
    println!("  Path:    {}", descriptor.path);
    println!("  Format:  {}", descriptor.format);
    println!("  URL:     {}", url_template);

    match &descriptor.payload {
        Some(payload) => {
            let pretty =
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            println!("  Payload:");
            for line in pretty.lines() {
                println!("    {}", line);
            }
            if !descriptor.method.carries_body() {
                println!(
                    "  {} payload is not sent with {}",
                    "!".yellow(),
                    descriptor.method
                );
            }
        }
        None => println!("  Payload: {}", "none".dimmed()),
    }

    if let Some(next) = &descriptor.then {
        println!("  Then:    {}", next);
    }
}

/// Registered clients for `devices`
pub fn devices(clients: &[DeviceRecord]) {
    if clients.is_empty() {
        println!("No clients registered");
        return;
    }

    println!("Registered clients:");
    for (i, client) in clients.iter().enumerate() {
        let marker = if i == 0 { "*" } else { " " };
        let mut details = Vec::new();
        if let Some(addr) = &client.address {
            details.push(addr.clone());
        }
        if let Some(version) = &client.lw_m2m_version {
            details.push(format!("LWM2M {}", version));
        }
        if let Some(reg) = &client.registration_id {
            details.push(format!("reg {}", reg));
        }

        if details.is_empty() {
            println!("  {} {}", marker, client.endpoint);
        } else {
            println!(
                "  {} {} {}",
                marker,
                client.endpoint,
                format!("({})", details.join(", ")).dimmed()
            );
        }
    }
    println!("\n  * used as the target of 'run'");
}
