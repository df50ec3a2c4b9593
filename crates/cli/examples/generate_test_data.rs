use std::fs::File;
use std::io::{BufWriter, Write};

fn row(
    writer: &mut impl Write,
    id: i64,
    address: &str,
    town: &str,
    date: &str,
    value: &str,
) -> std::io::Result<()> {
    writeln!(writer, "{}\t{}\t{}\t{}\t{}", id, address, town, date, value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/test_properties.tsv".to_string());

    let mut writer = BufWriter::new(File::create(&output_file)?);

    println!("Generating test dataset: {}\n", output_file);

    // Header and malformed rows are skipped by the reader
    println!("Adding header and malformed rows...");
    writeln!(writer, "id\taddress\ttown\tvaluation_date\tvalue")?;
    writeln!(writer, "1001\t12 SHORT ROW\tRIVERTON")?;
    writeln!(writer, "n/a\t3 BAD ID ST\tRIVERTON\t2020-01-01\t500000")?;

    // Same key, different addresses: keep-last vs keep-first vs keep-neither
    println!("Adding duplicate keys...");
    row(&mut writer, 5, "1 FIRST ST", "RIVERTON", "2021-01-01", "520000")?;
    row(&mut writer, 5, "2 SECOND ST", "RIVERTON", "2021-01-01", "530000")?;
    row(&mut writer, 6, "7 TRIPLE RD", "RIVERTON", "2021-01-01", "610000")?;
    row(&mut writer, 6, "7 TRIPLE RD", "RIVERTON", "2021-01-01", "615000")?;
    row(&mut writer, 6, "7 TRIPLE RD", "RIVERTON", "2021-01-01", "620000")?;

    // Same id, different valuation dates are distinct keys
    row(&mut writer, 7, "9 YEARLY DR", "LAKESIDE", "2020-01-01", "480000")?;
    row(&mut writer, 7, "9 YEARLY DR", "LAKESIDE", "2021-01-01", "495000")?;

    // Filter cases
    println!("Adding filter cases...");
    row(&mut writer, 10, "10 MAIN AVE", "LAKESIDE", "2020-01-01", "500000")?;
    row(&mut writer, 11, "4 MAPLE CRES", "LAKESIDE", "2020-01-01", "700000")?;
    row(&mut writer, 12, "8 BIRCH PL", "LAKESIDE", "2020-01-01", "900000")?;
    row(&mut writer, 13, "20 OAK ST", "LAKESIDE", "2020-01-01", "400000")?;
    row(&mut writer, 14, "21 OAK ST", "LAKESIDE", "2020-01-01", "unknown")?;

    // Enough passing rows to exercise the every-tenth sampling gate
    println!("Adding sampling rows...");
    for i in 0..40 {
        row(
            &mut writer,
            100 + i,
            &format!("{} HILLTOP RD", 100 + i),
            "HIGHFIELD",
            "2022-06-30",
            &(410_000 + i * 5_000).to_string(),
        )?;
    }

    writer.flush()?;

    println!("\nGenerated test dataset with 55 lines");
    println!("  - Skipped lines: 3");
    println!("  - Duplicate keys: 2");
    println!("  - Filter rejections: 5 before sampling");
    println!("\nRun with:");
    for mode in 1..=5 {
        println!("  cargo run -p propdedup-cli -- {} {} --stats", output_file, mode);
    }

    Ok(())
}
