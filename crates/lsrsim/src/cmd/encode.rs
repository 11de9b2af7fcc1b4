use lsrsim_frame::{Address, Label, LabelFrame, LinkFrame, Packet, Priority};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let destination =
        Address::new(&args.destination).map_err(|err| frame_error("invalid destination", err))?;
    let priority = Priority::new(args.priority).map_err(|err| frame_error("invalid priority", err))?;
    let packet = Packet::new(destination, args.payload.into_bytes(), priority);

    let label = args
        .label
        .map(Label::new)
        .transpose()
        .map_err(|err| frame_error("invalid label", err))?;

    let (wire, kind) = match label {
        Some(label) => {
            let frame = LabelFrame::encapsulate(label, &packet);
            if args.link {
                let link = LinkFrame::mpls(&frame);
                (link.to_bytes(), Some(link.kind))
            } else {
                (frame.to_bytes(), None)
            }
        }
        None if args.link => {
            let link = LinkFrame::network(&packet);
            (link.to_bytes(), Some(link.kind))
        }
        None => (packet.to_bytes(), None),
    };

    print_encoded(&wire, label, kind, format);
    Ok(SUCCESS)
}
