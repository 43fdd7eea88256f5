//! The fixed provisioning plan.
//!
//! Version pins are kept exactly as the downstream assignment scripts were
//! developed against; do not loosen them without checking those scripts.

pub const PACKAGE_MANAGER: &str = "apt-get";
pub const ELEVATION_HELPER: &str = "sudo";
pub const NONINTERACTIVE_ENV: (&str, &str) = ("DEBIAN_FRONTEND", "noninteractive");

pub const SYSTEM_PACKAGES: &[&str] = &[
    "python3",
    "python3-venv",
    "python3-pip",
    "python3-dev",
    "build-essential",
    "libssl-dev",
    "libffi-dev",
    "zlib1g-dev",
    "curl",
];

pub const SYSTEM_INTERPRETER: &str = "python3";
pub const VENV_DIR: &str = ".venv";
pub const WORKDIR: &str = "assignment3";
pub const ENTRYPOINT: &str = "main.py";

pub const TOOLING: &[&str] = &["pip", "setuptools", "wheel"];

pub struct InstallGroup {
    pub label: &'static str,
    pub packages: &'static [&'static str],
    pub index_url: Option<&'static str>,
}

pub const INSTALL_GROUPS: &[InstallGroup] = &[
    InstallGroup {
        label: "scientific",
        packages: &["numpy", "scipy", "pandas"],
        index_url: None,
    },
    InstallGroup {
        label: "cpu-torch",
        packages: &["torch"],
        index_url: Some("https://download.pytorch.org/whl/cpu"),
    },
    InstallGroup {
        label: "model-toolkit",
        packages: &["transformers>=4.41.0", "tokenizers>=0.19.0"],
        index_url: None,
    },
    InstallGroup {
        label: "utilities",
        packages: &[
            "gensim==4.3.3",
            "scikit-learn<1.6",
            "nltk==3.4.5",
            "beautifulsoup4==4.12.3",
            "openai<2.0",
            "google-generativeai<1.0",
            "GitPython==3.1.43",
        ],
        index_url: None,
    },
];

pub const VERIFY_MODULES: &[&str] = &["torch", "transformers", "gensim"];

/// Inline program that imports each module and prints its version, then the runtime's.
pub fn verify_program<S: AsRef<str>>(modules: &[S]) -> String {
    let mut program = String::from("import sys\n");
    for module in modules {
        program.push_str(&format!("import {}\n", module.as_ref()));
    }
    for module in modules {
        let module = module.as_ref();
        program.push_str(&format!("print('{module}', {module}.__version__)\n"));
    }
    program.push_str("print('python', sys.version.split()[0])\n");
    program
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_program_imports_every_module() {
        let program = verify_program(VERIFY_MODULES);
        assert_eq!(
            program,
            "import sys\nimport torch\nimport transformers\nimport gensim\n\
             print('torch', torch.__version__)\n\
             print('transformers', transformers.__version__)\n\
             print('gensim', gensim.__version__)\n\
             print('python', sys.version.split()[0])\n"
        );
    }

    #[test]
    fn test_only_torch_uses_alternate_index() {
        let with_index: Vec<&str> = INSTALL_GROUPS
            .iter()
            .filter(|g| g.index_url.is_some())
            .map(|g| g.label)
            .collect();
        assert_eq!(with_index, vec!["cpu-torch"]);
    }
}
