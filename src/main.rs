use cgigate::{invoke, privs, report, verify, WrapperConfig};

fn main() {
    let cfg = WrapperConfig::compiled();

    // Only the configured web-server identity may invoke the wrapper.
    if let Err(err) = verify::check_caller(&cfg) {
        report::report_fatal(cfg.log_ident, err);
    }

    // The caller checks out; shed the invoker's privilege for good.
    if let Err(err) = privs::drop_privilege() {
        report::report_fatal(cfg.log_ident, err);
    }

    // On success the script owns the process from here. Getting a value
    // back at all means the exec failed.
    let err = invoke::run_script(&cfg);
    report::report_fatal(cfg.log_ident, err);
}
