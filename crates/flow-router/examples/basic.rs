//! Render the route for a URL against a live component server
//!
//! ```text
//! cargo run -p flow-router --example basic -- flow.json http://localhost:8080/users/42
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use flow_dom::Document;
use flow_net::HttpSource;
use flow_router::{FlowConfig, Router};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    flow_router::logging::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => FlowConfig::from_file(path)?,
        None => FlowConfig::default(),
    };
    let page = args.next().unwrap_or_else(|| format!("{}/", config.origin));

    let mut document = Document::new(&page);
    let body = document.body();
    let app = document.create_element("div");
    document.set_attribute(app, "id", &config.mount_id);
    document.append_child(body, app);

    let source = HttpSource::new(&config.origin)?;
    let router = Router::new(Rc::new(RefCell::new(document)), config, source);

    println!("Flow Router v{}", flow_router::VERSION);
    let outcome = smol::block_on(router.start());
    println!("{} -> {:?}", router.current_path(), outcome);
    Ok(())
}
