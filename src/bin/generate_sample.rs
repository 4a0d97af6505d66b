use anyhow::{Context, Result};
use network_dashboard::data::loader::RawSheet;
use network_dashboard::export::encode_xlsx;
use network_dashboard::CellValue;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

fn text(s: impl Into<String>) -> CellValue {
    CellValue::Text(s.into())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let departments = ["Engineering", "Finance", "Library", "Dormitory", "Admin"];
    let ap_types = ["Indoor", "Outdoor", "Mesh"];
    let statuses = ["Online", "Offline", "Maintenance"];

    let headers = ["Name", "AP_Type", "IP_Address", "Switch IP", "Status", "Total_AP"]
        .map(str::to_string)
        .to_vec();

    let mut rows = Vec::new();
    for (dept_no, dept) in departments.iter().enumerate() {
        let switch_ip = format!("172.16.{dept_no}.1");
        for host in 0..8 {
            rows.push(vec![
                text(*dept),
                text(rng.pick(&ap_types)),
                text(format!("10.{dept_no}.0.{}", host + 10)),
                text(switch_ip.clone()),
                text(rng.pick(&statuses)),
                CellValue::Integer(1 + rng.below(12) as i64),
            ]);
        }
    }

    let sheet = RawSheet { headers, rows };
    let bytes = encode_xlsx(&sheet).context("encoding sample workbook")?;

    let output_path = "sample_inventory.xlsx";
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {} access-point rows ({} bytes) to {output_path}",
        sheet.rows.len(),
        bytes.len()
    );
    Ok(())
}
