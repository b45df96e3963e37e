//! Jobj command implementation.

use anyhow::Result;
use dolbones_core::JObj;

use super::Session;
use super::hex_utils::parse_ram_address;

/// Run the jobj command
pub fn run(session: &Session, address: &str, json: bool) -> Result<()> {
    let address = parse_ram_address(address)?;
    let reader = session.attach()?;
    let jobj = JObj::from_mem(&reader, address)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobj)?);
    } else {
        print_jobj(&jobj);
    }
    Ok(())
}

fn print_jobj(jobj: &JObj) {
    println!("=== JObj {} ===", jobj.address);
    println!("flags:     {:#010x} {:?}", jobj.flags.bits(), jobj.flags);
    println!("type:      {:?}", jobj.flags.joint_type());
    println!("rotate:    {:?}", jobj.rotate);
    println!("scale:     {:?}", jobj.scale);
    println!("translate: {:?}", jobj.translate);
    println!("mtx:");
    for row in &jobj.mtx {
        println!("  [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", row[0], row[1], row[2], row[3]);
    }
    println!("next:      {}", jobj.next);
    println!("parent:    {}", jobj.parent);
    println!("child:     {}", jobj.child);
}
