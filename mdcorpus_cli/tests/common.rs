use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn mdcorpus_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("mdcorpus"));
	cmd.env("NO_COLOR", "1").env_remove("MDCORPUS_LOG");
	cmd
}
