//! Static usage text, printed for root help when the daemon cannot be asked.

pub const USAGE: &str = "cubectl - command-line client for the service daemon REST API

USAGE:
    cubectl <path...> [add|set|show|del] [key=value...] [?]

DESCRIPTION:
    Path segments name a resource; the command says what to do with it.
    Without a command the path is created (POST). A trailing '?' asks the
    daemon for help on the path and command typed so far.

SHOW OPTIONS:
    -normal              Two levels of detail (default)
    -brief               One level of detail, lists collapse to counts
    -verbose             Three levels of detail
    -json                Pretty-printed JSON
    -yaml                YAML
    -hide=key0,key1      Hide fields by dotted path (table modes only)

CLIENT COMMANDS:
    connect <from> <to>          Connect two ports (cube:port)
    disconnect <from> <to>       Disconnect two ports
    attach <cube> <port> [opt]   Attach a transparent service to a port
    detach <cube> <port>         Detach a transparent service
    cubes | netdevs | topology   Show instances, net devices, topology
    version                      Show client and daemon versions

EXAMPLES:
    cubectl br1 ports add port1 peer=veth1
    cubectl br1 show -hide=uuid
    cubectl br1 set loglevel=DEBUG
    cat bridge.yaml | cubectl br2 add
";
