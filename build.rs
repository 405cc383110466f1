use std::{env, error::Error, fmt::Write, fs, path::Path};

struct Region {
    variant: String,
    id: &'static str,
}

/// `eu-west-1` -> `EuWest1`
fn variant_name(id: &str) -> String {
    id.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect(),
                None => String::new(),
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=regions.txt");
    let regions = include_str!("regions.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|id| Region {
            variant: variant_name(id),
            id,
        })
        .collect::<Vec<_>>();

    let mut buf = String::new();

    writeln!(buf, "/// AWS regions DynamoDB is available in")?;
    writeln!(buf, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]")?;
    writeln!(buf, "#[non_exhaustive]")?;
    writeln!(buf, "pub enum Region {{")?;
    for region in &regions {
        writeln!(buf, "    {},", region.variant)?;
    }
    writeln!(buf, "}}")?;

    writeln!(buf, "\nimpl Region {{")?;
    writeln!(buf, "    /// Every known region, in declaration order")?;
    writeln!(buf, "    pub const ALL: &'static [Region] = &[")?;
    for region in &regions {
        writeln!(buf, "        Region::{},", region.variant)?;
    }
    writeln!(buf, "    ];\n")?;

    writeln!(buf, "    /// Short region identifier, e.g. `us-east-1`")?;
    writeln!(buf, "    pub fn id(&self) -> &'static str {{")?;
    writeln!(buf, "        match self {{")?;
    for region in &regions {
        writeln!(buf, "            Region::{} => \"{}\",", region.variant, region.id)?;
    }
    writeln!(buf, "        }}\n    }}\n")?;

    writeln!(buf, "    /// Region specific DynamoDB endpoint")?;
    writeln!(buf, "    pub fn endpoint(&self) -> &'static str {{")?;
    writeln!(buf, "        match self {{")?;
    for region in &regions {
        writeln!(
            buf,
            "            Region::{} => \"https://dynamodb.{}.amazonaws.com\",",
            region.variant, region.id
        )?;
    }
    writeln!(buf, "        }}\n    }}")?;
    writeln!(buf, "}}")?;

    writeln!(buf, "\nimpl std::str::FromStr for Region {{")?;
    writeln!(buf, "    type Err = UnknownRegion;\n")?;
    writeln!(buf, "    fn from_str(s: &str) -> Result<Self, Self::Err> {{")?;
    writeln!(buf, "        match s {{")?;
    for region in &regions {
        writeln!(buf, "            \"{}\" => Ok(Region::{}),", region.id, region.variant)?;
    }
    writeln!(buf, "            other => Err(UnknownRegion(other.to_owned())),")?;
    writeln!(buf, "        }}\n    }}\n}}")?;

    let dest_path = Path::new(&env::var("OUT_DIR")?).join("region.rs");
    fs::write(&dest_path, buf)?;
    Ok(())
}
