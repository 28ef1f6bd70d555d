//! Command simulator.
//!
//! Produces deterministic, plausible fabricated output for the commands the
//! curriculum teaches. The simulator never inspects or touches the real
//! operating environment: identical `(command, args, context)` always yields
//! identical output, which is what makes golden-output testing possible.
//!
//! Commands the curriculum never implemented are not an error; they come
//! back as [`SimulatedOutput::NotSupported`] and are shown to the learner
//! as-is.

use std::fmt;

use crate::scenario::Scenario;

/// Fixed fake world state the simulator reads, if any. Lesson sessions use
/// an empty context; challenge sessions carry their scenario's artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimContext<'a> {
    pub scenario: Option<&'a Scenario>,
}

impl<'a> SimContext<'a> {
    #[must_use]
    pub const fn with_scenario(scenario: &'a Scenario) -> Self {
        Self {
            scenario: Some(scenario),
        }
    }
}

/// Fabricated output standing in for what a real command would print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedOutput {
    /// The simulated stdout of the command.
    Text(String),
    /// The curriculum has no simulation for this command. First-class
    /// output, not a failure.
    NotSupported { command: String },
}

impl SimulatedOutput {
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for SimulatedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::NotSupported { command } => {
                write!(f, "{command}: command simulation not available in this trainer")
            }
        }
    }
}

const LS_PLAIN: &str = "Documents  scripts  suspicious.log";

const LS_LONG: &str = "\
-rw-r--r--  1 user user  220 Dec 10 11:30 .bash_logout
-rw-r--r--  1 user user 3771 Dec 10 11:30 .bashrc
drwxr-xr-x  2 user user 4096 Dec 15 08:45 Documents
-rw-r--r--  1 user user  807 Dec 10 11:30 .profile
-rw-r--r--  1 user user 1024 Dec 15 10:30 suspicious.log
drwxr-xr-x  2 user user 4096 Dec 14 20:15 scripts";

const LS_LONG_ALL: &str = "\
total 48
drwxr-xr-x  5 user user 4096 Dec 15 10:30 .
drwxr-xr-x 20 user user 4096 Dec 15 09:15 ..
-rw-------  1 user user  156 Dec 14 16:22 .bash_history
-rw-r--r--  1 user user  220 Dec 10 11:30 .bash_logout
-rw-r--r--  1 user user 3771 Dec 10 11:30 .bashrc
drwxr-xr-x  2 user user 4096 Dec 15 08:45 Documents
-rw-r--r--  1 user user  807 Dec 10 11:30 .profile
-rw-r--r--  1 user user 1024 Dec 15 10:30 suspicious.log
drwxr-xr-x  2 user user 4096 Dec 14 20:15 scripts
drwx------  2 user user 4096 Dec 15 09:00 .ssh";

const LS_BIN: &str = "\
-rwxr-xr-x 1 root   root    12288 Dec 15 10:30 sudo
-rw-r--r-- 1 user   user     1024 Dec 15 09:15 document.txt
-rw------- 1 user   user      256 Dec 15 08:30 private.key
drwxrwxrwx 1 user   user     4096 Dec 15 07:45 public_folder
-rwsr-xr-x 1 root   root     8192 Dec 15 06:20 setuid_binary
-rwxrwxrwx 1 nobody nobody   2048 Dec 15 05:10 dangerous_script.sh";

const SUSPICIOUS_LOG: &str = "\
[2024-12-15 10:15:32] ERROR: Failed login attempt from 192.168.1.100
[2024-12-15 10:16:45] ERROR: Invalid password for user admin
[2024-12-15 10:18:22] ERROR: Connection refused on port 22
[2024-12-15 10:20:01] INFO: Session opened for user admin
[2024-12-15 10:25:17] INFO: Scheduled backup completed";

const FAILED_LOGINS: &str = "\
Dec 15 08:30:15 server sshd[1234]: Failed password for root from 192.168.1.50
Dec 15 08:30:20 server sshd[1235]: Failed password for admin from 192.168.1.50
Dec 15 08:30:25 server sshd[1236]: Failed password for root from 192.168.1.50";

const FIND_LOGS: &str = "\
/home/user/suspicious.log
/var/log/auth.log
/var/log/syslog
/var/log/apache2/access.log
/var/log/apache2/error.log";

const FIND_CONFIGS: &str = "\
/etc/ssh/ssh_config
/etc/apache2/apache2.conf
/home/user/.bashrc
/etc/mysql/my.cnf";

const FIND_SUID: &str = "\
/usr/bin/sudo
/usr/bin/passwd
/usr/bin/su
/bin/mount
/bin/umount";

const FIND_WORLD_WRITABLE: &str = "\
/tmp/dangerous_file
/var/tmp/world_writable
/home/user/public_folder";

const FIND_DEFAULT: &str = "\
/home/user/Documents
/home/user/scripts
/home/user/suspicious.log";

const HISTORY: &str = "  1  pwd
  2  ls -la
  3  cd /var/log
  4  cat auth.log
  5  grep -i 'failed' auth.log
  6  history";

const NETSTAT_LISTEN: &str = "\
Active Internet connections (only servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN
tcp        0      0 127.0.0.1:3306          0.0.0.0:*               LISTEN
tcp        0      0 0.0.0.0:80              0.0.0.0:*               LISTEN
tcp        0      0 0.0.0.0:443             0.0.0.0:*               LISTEN
udp        0      0 0.0.0.0:53              0.0.0.0:*
udp        0      0 0.0.0.0:68              0.0.0.0:*";

const NETSTAT_ESTABLISHED: &str = "\
Active Internet connections
Proto Local Address    Foreign Address    State
tcp   192.168.1.10:80  192.168.1.50:5432  ESTABLISHED
tcp   192.168.1.10:22  192.168.1.100:4455 ESTABLISHED";

const STRINGS_OUT: &str = "\
HTTP/1.1
User-Agent: Mozilla/5.0
www.suspicious-site.com
password123
admin@company.com
CreateProcess
LoadLibrary
/tmp/malware.txt";

const HEXDUMP_OUT: &str = "\
0000000 4d5a 9000 0003 0000 0004 0000 ffff 0000
0000010 00b8 0000 0000 0000 0040 0000 0000 0000
0000020 0000 0000 0000 0000 0000 0000 0000 0000
0000030 0000 0000 0000 0000 0000 0000 0080 0000
0000040 0e1f ba0e 00b4 09cd 21b8 014c cd21 5468";

const MD5_EMPTY: &str = "d41d8cd98f00b204e9800998ecf8427e";
const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Simulate one command. `command_name` is the bare command, `args` the rest
/// of the line, already split on whitespace.
#[must_use]
pub fn simulate(command_name: &str, args: &[&str], context: &SimContext<'_>) -> SimulatedOutput {
    let joined = args.join(" ");
    let text = match command_name {
        "pwd" => "/home/user".to_string(),
        "whoami" => "user".to_string(),
        "id" => "uid=1000(user) gid=1000(user) groups=1000(user),4(adm),27(sudo)".to_string(),
        "umask" => "0022".to_string(),
        "cd" => String::new(),
        "history" => HISTORY.to_string(),
        "ls" => simulate_ls(args, context),
        "cat" => simulate_cat(args, context),
        "head" => take_lines(&file_body(args, context), line_count_arg(args), false),
        "tail" => take_lines(&file_body(args, context), line_count_arg(args), true),
        "wc" => simulate_wc(args, context),
        "find" => simulate_find(&joined),
        "grep" => simulate_grep(args, context),
        "ping" => simulate_ping(args),
        "netstat" | "ss" => simulate_netstat(context),
        "nmap" => simulate_nmap(args),
        "traceroute" => simulate_traceroute(args),
        "whois" => simulate_whois(args),
        "file" => simulate_file(args),
        "strings" => STRINGS_OUT.to_string(),
        "hexdump" | "xxd" => HEXDUMP_OUT.to_string(),
        "md5sum" => format!("{MD5_EMPTY}  {}", last_operand(args, "file.txt")),
        "sha256sum" => format!("{SHA256_EMPTY}  {}", last_operand(args, "file.txt")),
        "stat" => simulate_stat(args),
        "chmod" => simulate_chmod(args),
        _ => {
            return SimulatedOutput::NotSupported {
                command: command_name.to_string(),
            }
        }
    };
    SimulatedOutput::Text(text)
}

/// Simulate a full command line; splits on whitespace and dispatches.
#[must_use]
pub fn simulate_line(line: &str, context: &SimContext<'_>) -> SimulatedOutput {
    let mut parts = line.split_whitespace();
    let Some(command_name) = parts.next() else {
        return SimulatedOutput::Text(String::new());
    };
    let args: Vec<&str> = parts.collect();
    simulate(command_name, &args, context)
}

/// Last argument that is not a flag, or `fallback` when there is none.
fn last_operand<'s>(args: &[&'s str], fallback: &'s str) -> &'s str {
    args.iter()
        .rev()
        .find(|a| !a.starts_with('-'))
        .copied()
        .unwrap_or(fallback)
}

/// Collected short-flag characters (`-la` contributes both `l` and `a`).
fn flag_chars(args: &[&str]) -> Vec<char> {
    args.iter()
        .filter(|a| a.starts_with('-') && !a.starts_with("--"))
        .flat_map(|a| a.chars().skip(1))
        .collect()
}

fn line_count_arg(args: &[&str]) -> usize {
    args.iter()
        .filter_map(|a| a.strip_prefix('-'))
        .find_map(|a| a.parse::<usize>().ok())
        .unwrap_or(10)
}

fn simulate_ls(args: &[&str], context: &SimContext<'_>) -> String {
    if let Some(scenario) = context.scenario {
        for arg in args {
            if let Some(listing) = scenario.artifacts.listings.get(*arg) {
                return listing.trim_end().to_string();
            }
        }
    }
    let flags = flag_chars(args);
    let operand = last_operand(args, ".");
    if operand.contains("/bin") {
        LS_BIN.to_string()
    } else if flags.contains(&'l') && flags.contains(&'a') {
        LS_LONG_ALL.to_string()
    } else if flags.contains(&'l') {
        LS_LONG.to_string()
    } else {
        LS_PLAIN.to_string()
    }
}

/// Full fabricated content of the file an argument list refers to.
fn file_body(args: &[&str], context: &SimContext<'_>) -> String {
    let name = last_operand(args, "suspicious.log");
    if let Some(scenario) = context.scenario {
        if let Some(listing) = scenario.artifacts.listings.get(name) {
            return listing.trim_end().to_string();
        }
        if name.ends_with(".log") && !scenario.artifacts.log_lines.is_empty() {
            return scenario.artifacts.log_lines.join("\n");
        }
    }
    match name {
        "suspicious.log" => SUSPICIOUS_LOG.to_string(),
        "auth.log" | "/var/log/auth.log" => FAILED_LOGINS.to_string(),
        other => format!("cat: {other}: No such file or directory"),
    }
}

fn simulate_cat(args: &[&str], context: &SimContext<'_>) -> String {
    file_body(args, context)
}

fn take_lines(body: &str, count: usize, from_end: bool) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let taken: Vec<&str> = if from_end {
        lines.iter().rev().take(count).rev().copied().collect()
    } else {
        lines.iter().take(count).copied().collect()
    };
    taken.join("\n")
}

fn simulate_wc(args: &[&str], context: &SimContext<'_>) -> String {
    let name = last_operand(args, "suspicious.log");
    let body = file_body(args, context);
    format!("{} {name}", body.lines().count())
}

fn simulate_find(joined: &str) -> String {
    if joined.contains("-perm") && (joined.contains("4000") || joined.contains("u+s")) {
        FIND_SUID.to_string()
    } else if joined.contains("-perm")
        && (joined.contains("777") || joined.contains("o+w") || joined.contains("002"))
    {
        FIND_WORLD_WRITABLE.to_string()
    } else if joined.contains(".log") {
        FIND_LOGS.to_string()
    } else if joined.contains("config") || joined.contains(".conf") {
        FIND_CONFIGS.to_string()
    } else {
        FIND_DEFAULT.to_string()
    }
}

fn simulate_grep(args: &[&str], context: &SimContext<'_>) -> String {
    let pattern = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .map(|a| a.trim_matches(|c| c == '\'' || c == '"'))
        .unwrap_or_default();

    // Inside a scenario, grep really searches the scripted log.
    if let Some(scenario) = context.scenario {
        if !scenario.artifacts.log_lines.is_empty() {
            let needle = pattern.to_lowercase();
            let hits: Vec<&str> = scenario
                .artifacts
                .log_lines
                .iter()
                .filter(|line| line.to_lowercase().contains(&needle))
                .map(String::as_str)
                .collect();
            return if hits.is_empty() {
                String::new()
            } else {
                hits.join("\n")
            };
        }
    }

    let lowered = pattern.to_lowercase();
    if lowered.contains("error") {
        take_lines(SUSPICIOUS_LOG, 3, false)
    } else if lowered.contains("failed") {
        FAILED_LOGINS.to_string()
    } else {
        format!("grep: no matches for '{pattern}'")
    }
}

fn simulate_ping(args: &[&str]) -> String {
    let target = last_operand(args, "192.168.1.1");
    format!(
        "PING {target} 56(84) bytes of data.\n\
         64 bytes from {target}: icmp_seq=1 ttl=64 time=1.23 ms\n\
         64 bytes from {target}: icmp_seq=2 ttl=64 time=1.45 ms\n\
         64 bytes from {target}: icmp_seq=3 ttl=64 time=1.12 ms\n\
         \n\
         --- {target} ping statistics ---\n\
         3 packets transmitted, 3 received, 0% packet loss"
    )
}

fn simulate_netstat(context: &SimContext<'_>) -> String {
    if let Some(scenario) = context.scenario {
        if !scenario.artifacts.connections.is_empty() {
            return scenario.artifacts.connections.join("\n");
        }
    }
    format!("{NETSTAT_LISTEN}\n\n{NETSTAT_ESTABLISHED}")
}

fn simulate_nmap(args: &[&str]) -> String {
    let target = last_operand(args, "192.168.1.1");
    format!(
        "Starting Nmap scan on {target}...\n\
         \n\
         Nmap scan report for {target}\n\
         Host is up (0.0012s latency).\n\
         Not shown: 996 closed ports\n\
         PORT     STATE SERVICE\n\
         22/tcp   open  ssh\n\
         80/tcp   open  http\n\
         443/tcp  open  https\n\
         3306/tcp open  mysql\n\
         \n\
         Nmap done: 1 IP address scanned"
    )
}

fn simulate_traceroute(args: &[&str]) -> String {
    let target = last_operand(args, "8.8.8.8");
    format!(
        "traceroute to {target}, 30 hops max, 60 byte packets\n \
         1  router.local (192.168.1.1)  1.234 ms\n \
         2  10.0.0.1 (10.0.0.1)  15.234 ms\n \
         3  * * *\n \
         4  {target}  45.234 ms"
    )
}

fn simulate_whois(args: &[&str]) -> String {
    let domain = last_operand(args, "example.com");
    format!(
        "Domain Name: {}\n\
         Registrar: Example Registrar, Inc.\n\
         Creation Date: 1995-08-14\n\
         Registry Expiry Date: 2026-08-13\n\
         Name Server: a.iana-servers.net\n\
         Name Server: b.iana-servers.net",
        domain.to_uppercase()
    )
}

fn simulate_file(args: &[&str]) -> String {
    let name = last_operand(args, "suspicious.exe");
    let kind = match name {
        "suspicious.exe" => "PE32 executable (GUI) Intel 80386, for MS Windows",
        "document.pdf" => "PDF document, version 1.4",
        "image.jpg" => "JPEG image data, JFIF standard 1.01",
        "script.sh" => "Bourne-Again shell script, ASCII text executable",
        "data.bin" => "data",
        _ => "ASCII text",
    };
    format!("{name}: {kind}")
}

fn simulate_stat(args: &[&str]) -> String {
    let name = last_operand(args, "evidence.txt");
    format!(
        "  File: {name}\n\
         \x20 Size: 4096      \tBlocks: 8          IO Block: 4096   regular file\n\
         Device: 801h/2049d\tInode: 123456      Links: 1\n\
         Access: (0644/-rw-r--r--)  Uid: (1000/user)   Gid: (1000/user)\n\
         Access: 2024-12-15 10:30:45.000000000 +0000\n\
         Modify: 2024-12-15 10:25:32.000000000 +0000\n\
         Change: 2024-12-15 10:25:32.000000000 +0000"
    )
}

fn simulate_chmod(args: &[&str]) -> String {
    let operands: Vec<&str> = args.iter().filter(|a| !a.starts_with('-')).copied().collect();
    match operands.as_slice() {
        [_mode, file, ..] => format!("mode of '{file}' changed"),
        _ => "chmod: missing operand".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn simulate_is_pure() {
        let ctx = SimContext::default();
        let first = simulate("ls", &["-la"], &ctx);
        let second = simulate("ls", &["-la"], &ctx);
        assert_eq!(first, second);

        // Purity holds across contexts constructed separately too.
        let other_ctx = SimContext::default();
        assert_eq!(first, simulate("ls", &["-la"], &other_ctx));
    }

    #[test]
    fn unknown_commands_are_not_supported_not_fatal() {
        let out = simulate("vim", &[], &SimContext::default());
        assert_eq!(
            out,
            SimulatedOutput::NotSupported {
                command: "vim".to_string()
            }
        );
        assert!(!out.is_supported());
        assert!(out.to_string().contains("vim"));
    }

    #[test]
    fn ls_flags_select_the_listing() {
        let ctx = SimContext::default();
        let plain = simulate("ls", &[], &ctx).to_string();
        let long = simulate("ls", &["-l"], &ctx).to_string();
        let all = simulate("ls", &["-la"], &ctx).to_string();
        assert!(!plain.contains(".ssh"));
        assert!(!long.contains(".ssh"));
        assert!(all.contains(".ssh"));
    }

    #[test]
    fn scenario_context_overrides_the_fake_world() {
        let scenario = Scenario::from_yaml(
            r#"
id: ctx
title: Ctx
artifacts:
  log_lines:
    - "Failed password for root from 10.1.1.1"
    - "Accepted password for root from 10.1.1.1"
  connections:
    - "10.0.0.5 -> 192.168.1.100 TCP 80 [SYN]"
goals:
  - id: g
    prompt: q
    answer:
      equals: a
"#,
        )
        .unwrap();
        let ctx = SimContext::with_scenario(&scenario);

        let log = simulate("cat", &["auth.log"], &ctx).to_string();
        assert!(log.contains("Failed password for root"));

        let hits = simulate("grep", &["Accepted", "auth.log"], &ctx).to_string();
        assert_eq!(hits, "Accepted password for root from 10.1.1.1");

        let conns = simulate("netstat", &[], &ctx).to_string();
        assert_eq!(conns, "10.0.0.5 -> 192.168.1.100 TCP 80 [SYN]");
    }

    #[test]
    fn head_and_tail_slice_the_fake_file() {
        let ctx = SimContext::default();
        let head = simulate("head", &["-2", "suspicious.log"], &ctx).to_string();
        assert_eq!(head.lines().count(), 2);
        assert!(head.contains("10:15:32"));

        let tail = simulate("tail", &["-1", "suspicious.log"], &ctx).to_string();
        assert_eq!(tail.lines().count(), 1);
        assert!(tail.contains("backup completed"));
    }

    #[test]
    fn simulate_line_splits_on_whitespace() {
        let ctx = SimContext::default();
        assert_eq!(
            simulate_line("pwd", &ctx),
            SimulatedOutput::Text("/home/user".to_string())
        );
        assert_eq!(
            simulate_line("grep -i 'error'  suspicious.log", &ctx),
            simulate("grep", &["-i", "'error'", "suspicious.log"], &ctx)
        );
        assert_eq!(
            simulate_line("   ", &ctx),
            SimulatedOutput::Text(String::new())
        );
    }

    #[test]
    fn wc_counts_fabricated_lines() {
        let out = simulate("wc", &["-l", "suspicious.log"], &SimContext::default());
        assert_eq!(out.to_string(), "5 suspicious.log");
    }
}
